///! Output formatting for CLI
///!
///! Shared by every command so agent listings and results look the same
///! whichever command produced them.

use colored::Colorize;
use deploywait_common::AgentStates;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    #[serde(alias = "yml")]
    #[value(alias = "yml")]
    Yaml,
}

/// One line per agent state
#[derive(Tabled, Serialize)]
pub struct AgentStateRow {
    state: String,
    count: usize,
    agents: String,
}

pub fn agent_state_rows(states: &AgentStates) -> Vec<AgentStateRow> {
    states
        .iter()
        .map(|(state, agents)| AgentStateRow {
            state: state.to_string(),
            count: agents.len(),
            agents: agents.join(", "),
        })
        .collect()
}

/// Print agent states as a table, or the raw grouping as JSON/YAML
pub fn print_agent_states(states: &AgentStates, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print_table(agent_state_rows(states)),
        OutputFormat::Json => print_json(states)?,
        OutputFormat::Yaml => print_yaml(states)?,
    }
    Ok(())
}

/// Print data as a table using the tabled crate
pub fn print_table<T: Tabled>(data: Vec<T>) {
    if data.is_empty() {
        println!("{}", "No agents found".yellow());
        return;
    }

    let table = Table::new(data);
    println!("{}", table);
}

/// Print data as pretty-printed JSON
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{}", json);
    Ok(())
}

/// Print data as YAML
pub fn print_yaml<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    println!("{}", yaml);
    Ok(())
}

/// Print a single item in the specified format
pub fn print_single<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            // For single items in table format, use YAML
            print_yaml(data)?;
        }
        OutputFormat::Json => print_json(data)?,
        OutputFormat::Yaml => print_yaml(data)?,
    }
    Ok(())
}

/// Print a success message with green checkmark
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Print an error message with red X
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Print an info message with blue i
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a waiting message with yellow hourglass
pub fn print_waiting(message: &str) {
    println!("{} {}", "⧗".yellow().bold(), message);
}

/// Spinner shown while a poll is in flight
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Format a duration to a human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        let m = secs / 60;
        let s = secs % 60;
        if s > 0 {
            format!("{}m {}s", m, s)
        } else {
            format!("{}m", m)
        }
    } else {
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        if m > 0 {
            format!("{}h {}m", h, m)
        } else {
            format!("{}h", h)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        use clap::ValueEnum;

        assert_eq!(OutputFormat::from_str("json", true).unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("JSON", true).unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("yml", true).unwrap(), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_str("table", true).unwrap(), OutputFormat::Table);
        assert!(OutputFormat::from_str("jsno", true).is_err());
    }

    #[test]
    fn test_agent_state_rows() {
        let mut states = AgentStates::default();
        states.insert("started", "0");
        states.insert("started", "1");
        states.insert("pending", "wordpress/0");

        let rows = agent_state_rows(&states);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].state, "pending");
        assert_eq!(rows[0].agents, "wordpress/0");
        assert_eq!(rows[1].count, 2);
        assert_eq!(rows[1].agents, "0, 1");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(300)), "5m");
        assert_eq!(format_duration(Duration::from_secs(312)), "5m 12s");
        assert_eq!(format_duration(Duration::from_secs(7260)), "2h 1m");
    }
}
