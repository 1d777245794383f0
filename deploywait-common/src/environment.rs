///! Orchestration client wrapper
///! Runs `juju` subcommands against a named environment and waits for its agents

use crate::status::{format_listing, AgentStates, Status, STARTED};
use crate::timeout::UntilTimeout;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

pub const DEFAULT_JUJU_BINARY: &str = "juju";

/// Anything that can report the current status document
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn get_status(&self) -> Result<Status>;
}

/// A named environment managed through the `juju` client
#[derive(Debug, Clone)]
pub struct Environment {
    name: String,
    juju_bin: PathBuf,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            juju_bin: PathBuf::from(DEFAULT_JUJU_BINARY),
        }
    }

    /// Use a specific client binary instead of `juju` from PATH
    pub fn with_binary(mut self, juju_bin: impl Into<PathBuf>) -> Self {
        self.juju_bin = juju_bin.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn juju_bin(&self) -> &Path {
        &self.juju_bin
    }

    /// Arguments for `command` scoped to this environment
    pub fn full_args<S: AsRef<str>>(&self, command: &str, args: &[S]) -> Vec<String> {
        let mut full = vec![command.to_string(), "-e".to_string(), self.name.clone()];
        full.extend(args.iter().map(|a| a.as_ref().to_string()));
        full
    }

    fn command_line(&self, args: &[String]) -> String {
        let mut line = vec![self.juju_bin.display().to_string()];
        line.extend(args.iter().cloned());
        line.join(" ")
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.juju_bin);
        cmd.args(args);
        cmd.kill_on_drop(true);
        cmd
    }

    /// Run a command under juju for this environment, output goes to our stdio
    pub async fn juju<S: AsRef<str>>(&self, command: &str, args: &[S]) -> Result<()> {
        let args = self.full_args(command, args);
        let line = self.command_line(&args);
        info!("{}", line);

        let status = self
            .command(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;

        if !status.success() {
            return Err(Error::CommandFailed {
                command: line,
                code: status.code(),
                stderr: String::new(),
            });
        }

        Ok(())
    }

    async fn capture(&self, args: &[String]) -> Result<String> {
        let line = self.command_line(args);
        debug!("Running {}", line);

        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: line,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl StatusSource for Environment {
    /// Get the current status document
    async fn get_status(&self) -> Result<Status> {
        let args = self.full_args::<&str>("status", &[]);
        let stdout = self.capture(&args).await?;
        Status::from_yaml(&stdout)
    }
}

/// Bounds for [`wait_for_started`]
#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub expected_state: String,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(1),
            expected_state: STARTED.to_string(),
        }
    }
}

/// Wait until every machine and unit agent reports the expected state.
///
/// Returns the status that satisfied the wait. Fails as soon as any agent is
/// in an errored state, or once `options.timeout` has elapsed.
pub async fn wait_for_started<S>(source: &S, options: &WaitOptions) -> Result<Status>
where
    S: StatusSource + ?Sized,
{
    wait_for_started_with(source, options, |_, _| {}).await
}

/// Like [`wait_for_started`], calling `on_progress` with the current states and
/// the listing of agents not yet in the expected state after every
/// unsuccessful round.
pub async fn wait_for_started_with<S, F>(
    source: &S,
    options: &WaitOptions,
    mut on_progress: F,
) -> Result<Status>
where
    S: StatusSource + ?Sized,
    F: FnMut(&AgentStates, &str),
{
    let expected = options.expected_state.as_str();

    let mut countdown = UntilTimeout::new(options.timeout);
    while countdown.next().is_some() {
        let status = source.get_status().await?;
        let states = status.agent_states();

        if states.all_in(expected) {
            info!("All {} agents are {}", states.agent_count(), expected);
            return Ok(status);
        }

        if let Some((state, unit)) = states.first_errored() {
            warn!("Agent {} is in state {}", unit, state);
            return Err(Error::ErroredUnit {
                unit: unit.to_string(),
                state: state.to_string(),
            });
        }

        let listing = format_listing(&states, expected);
        // The fetch itself eats into the budget
        let remaining = countdown.remaining();
        info!(remaining_secs = remaining.as_secs(), "{}", listing);
        on_progress(&states, &listing);

        tokio::time::sleep(options.poll_interval.min(remaining)).await;
    }

    Err(Error::Timeout {
        what: format!("agents to be {}", expected),
        seconds: countdown.timeout().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned status documents, repeating the last one forever
    struct ScriptedSource {
        documents: Mutex<VecDeque<&'static str>>,
        calls: Mutex<usize>,
    }

    impl ScriptedSource {
        fn new(documents: &[&'static str]) -> Self {
            Self {
                documents: Mutex::new(documents.iter().copied().collect()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn get_status(&self) -> Result<Status> {
            *self.calls.lock().unwrap() += 1;
            let mut documents = self.documents.lock().unwrap();
            let doc = if documents.len() > 1 {
                documents.pop_front().unwrap()
            } else {
                documents[0]
            };
            Status::from_yaml(doc)
        }
    }

    const PENDING: &str = "machines:\n  \"0\":\n    agent-state: started\n  \"1\":\n    agent-state: pending\n";
    const STARTED_ALL: &str = "machines:\n  \"0\":\n    agent-state: started\n  \"1\":\n    agent-state: started\n";
    const ERRORED: &str = "machines:\n  \"0\":\n    agent-state: started\nservices:\n  wordpress:\n    units:\n      wordpress/0:\n        agent-state: install-error\n";

    fn fast(timeout: Duration) -> WaitOptions {
        WaitOptions {
            timeout,
            poll_interval: Duration::from_millis(5),
            ..WaitOptions::default()
        }
    }

    #[test]
    fn test_full_args() {
        let env = Environment::new("local");
        assert_eq!(
            env.full_args("deploy", &["wordpress"]),
            vec!["deploy", "-e", "local", "wordpress"]
        );
        assert_eq!(env.full_args::<&str>("status", &[]), vec!["status", "-e", "local"]);
    }

    #[test]
    fn test_default_wait_options() {
        let options = WaitOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(300));
        assert_eq!(options.expected_state, "started");
    }

    #[tokio::test]
    async fn test_wait_succeeds_once_all_started() {
        let source = ScriptedSource::new(&[PENDING, PENDING, STARTED_ALL]);
        let mut listings = Vec::new();

        let status = wait_for_started_with(&source, &fast(Duration::from_secs(5)), |_, listing| {
            listings.push(listing.to_string())
        })
        .await
        .unwrap();

        assert_eq!(status.machines.len(), 2);
        assert_eq!(source.calls(), 3);
        assert_eq!(listings, vec!["pending: 1", "pending: 1"]);
    }

    #[tokio::test]
    async fn test_wait_fails_on_errored_unit() {
        let source = ScriptedSource::new(&[PENDING, ERRORED]);
        let err = wait_for_started(&source, &fast(Duration::from_secs(5)))
            .await
            .unwrap_err();

        match err {
            Error::ErroredUnit { unit, state } => {
                assert_eq!(unit, "wordpress/0");
                assert_eq!(state, "install-error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let source = ScriptedSource::new(&[PENDING]);
        let err = wait_for_started(&source, &fast(Duration::from_millis(50)))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout { .. }));
        assert!(source.calls() >= 1);
    }

    #[tokio::test]
    async fn test_empty_status_is_not_started() {
        let source = ScriptedSource::new(&["machines: {}\n"]);
        let err = wait_for_started(&source, &fast(Duration::from_millis(30)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_zero_timeout_never_polls() {
        let source = ScriptedSource::new(&[STARTED_ALL]);
        let err = wait_for_started(&source, &fast(Duration::ZERO))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout { .. }));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_custom_expected_state() {
        let source = ScriptedSource::new(&[PENDING]);
        let options = WaitOptions {
            expected_state: "pending".to_string(),
            ..fast(Duration::from_millis(30))
        };
        // "started" agents keep "pending" from being the only state
        let err = wait_for_started(&source, &options).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }

    /// Takes `delay` to answer, always with a pending agent
    struct SlowSource {
        delay: Duration,
    }

    #[async_trait]
    impl StatusSource for SlowSource {
        async fn get_status(&self) -> Result<Status> {
            tokio::time::sleep(self.delay).await;
            Status::from_yaml(PENDING)
        }
    }

    #[tokio::test]
    async fn test_slow_status_fetch_does_not_extend_sleep() {
        let source = SlowSource {
            delay: Duration::from_millis(300),
        };
        let options = WaitOptions {
            timeout: Duration::from_millis(400),
            poll_interval: Duration::from_secs(10),
            ..WaitOptions::default()
        };

        let started = std::time::Instant::now();
        let err = wait_for_started(&source, &options).await.unwrap_err();

        assert!(matches!(err, Error::Timeout { seconds: 0, .. }));
        // One fetch plus what was left of the budget, not a second full budget
        assert!(started.elapsed() < Duration::from_millis(650));
    }
}
