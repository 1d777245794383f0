use crate::output::{self, OutputFormat};
use anyhow::Result;
use deploywait_common::{Environment, StatusSource};

pub async fn handle_status(env: &Environment, format: OutputFormat) -> Result<()> {
    let status = env.get_status().await?;
    let states = status.agent_states();

    if format == OutputFormat::Table {
        println!("Environment '{}': {} agents", env.name(), states.agent_count());
    }
    output::print_agent_states(&states, format)
}
