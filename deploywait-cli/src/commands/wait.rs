use crate::config::Config;
use crate::output::{self, format_duration, OutputFormat};
use anyhow::Result;
use deploywait_common::{wait_for_started_with, Environment, WaitOptions};
use std::time::{Duration, Instant};

/// Wait options from the config file, overridden by command-line values
pub fn wait_options(config: &Config, timeout: Option<u64>, interval: Option<u64>) -> WaitOptions {
    WaitOptions {
        timeout: Duration::from_secs(timeout.unwrap_or(config.start_timeout_secs)),
        poll_interval: Duration::from_secs(interval.unwrap_or(config.poll_interval_secs)),
        ..WaitOptions::default()
    }
}

pub async fn handle_wait_started(
    env: &Environment,
    config: &Config,
    timeout: Option<u64>,
    interval: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    let options = wait_options(config, timeout, interval);
    let started = Instant::now();

    if format == OutputFormat::Table {
        output::print_info(&format!(
            "Waiting up to {} for agents in '{}' to start",
            format_duration(options.timeout),
            env.name()
        ));
    }

    let status = wait_for_started_with(env, &options, |_, listing| {
        if format == OutputFormat::Table {
            output::print_waiting(listing);
        }
    })
    .await?;

    let states = status.agent_states();
    if format == OutputFormat::Table {
        output::print_success(&format!(
            "All {} agents started after {}",
            states.agent_count(),
            format_duration(started.elapsed())
        ));
    }
    output::print_agent_states(&states, format)
}
