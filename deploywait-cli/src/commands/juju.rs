use crate::output;
use anyhow::Result;
use deploywait_common::Environment;

pub async fn handle_juju(env: &Environment, command: &str, args: &[String]) -> Result<()> {
    env.juju(command, args).await?;
    output::print_success(&format!("juju {} finished on '{}'", command, env.name()));
    Ok(())
}
