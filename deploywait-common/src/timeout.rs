///! Countdown iterator bounding every polling loop

use std::time::{Duration, Instant};

/// Yields the remaining time until `timeout` has elapsed since `start`.
///
/// Polling loops drive themselves with `for remaining in UntilTimeout::new(..)`
/// and treat falling out of the loop as a timeout.
#[derive(Debug, Clone)]
pub struct UntilTimeout {
    timeout: Duration,
    start: Instant,
    exhausted: bool,
}

impl UntilTimeout {
    pub fn new(timeout: Duration) -> Self {
        Self::starting_at(timeout, Instant::now())
    }

    /// Count down from an explicit start instant
    pub fn starting_at(timeout: Duration, start: Instant) -> Self {
        Self {
            timeout,
            start,
            exhausted: false,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time left in the budget, zero once it has run out
    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.elapsed())
    }
}

impl Iterator for UntilTimeout {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.exhausted {
            return None;
        }

        let remaining = self.remaining();
        if remaining.is_zero() {
            self.exhausted = true;
            return None;
        }
        Some(remaining)
    }
}

impl std::iter::FusedIterator for UntilTimeout {}
