///! deploywait CLI
///!
///! Waits for a juju environment to come up and for its web pages to answer

mod commands;
mod config;
mod logging;
mod output;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use deploywait_common::Environment;
use output::OutputFormat;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Environment to operate on
    #[arg(short, long, env = "JUJU_ENV", global = true)]
    environment: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    output: Option<OutputFormat>,

    /// Path to the juju client binary
    #[arg(long, global = true)]
    juju_binary: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait until every machine and unit agent is started
    WaitStarted {
        /// Seconds to wait before giving up
        #[arg(short, long)]
        timeout: Option<u64>,
        /// Seconds between status polls
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Show agents grouped by state
    Status,
    /// Wait for the WordPress install page on a host
    CheckWordpress {
        /// Host name or address serving WordPress
        host: String,
        /// Seconds to wait before giving up
        #[arg(short, long)]
        timeout: Option<u64>,
    },
    /// Wait for a page to contain some text
    CheckPage {
        /// URL to poll
        url: String,
        /// Text the page must contain
        #[arg(short = 'x', long)]
        expect: String,
        /// Seconds to wait before giving up
        #[arg(short, long)]
        timeout: Option<u64>,
        /// Seconds between attempts
        #[arg(short, long, default_value_t = 1)]
        interval: u64,
    },
    /// Run a juju command against the environment
    Juju {
        /// juju subcommand (deploy, expose, add-relation, ...)
        command: String,
        /// Arguments passed after `-e <environment>`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Manage the CLI configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Load config, command-line flags win over it
    let mut config = config::Config::load()?;
    if let Some(ref juju_binary) = cli.juju_binary {
        config.juju_binary = juju_binary.clone();
    }
    if let Some(ref environment) = cli.environment {
        config.default_environment = Some(environment.clone());
    }
    if let Some(output) = cli.output {
        config.default_output = output;
    }

    let _log_guard = logging::LoggingConfig {
        level: config.log_level.clone(),
        file_path: config.log_file.clone(),
        json_format: config.log_json,
    }
    .with_verbosity(cli.verbose)
    .init()?;

    let output_format = config.default_output;

    match cli.command {
        Commands::WaitStarted { timeout, interval } => {
            let env = environment(&config)?;
            commands::wait::handle_wait_started(&env, &config, timeout, interval, output_format)
                .await?
        }
        Commands::Status => {
            let env = environment(&config)?;
            commands::status::handle_status(&env, output_format).await?
        }
        Commands::CheckWordpress { host, timeout } => {
            commands::page::handle_check_wordpress(&host, timeout.unwrap_or(config.page_timeout_secs))
                .await?
        }
        Commands::CheckPage {
            url,
            expect,
            timeout,
            interval,
        } => {
            commands::page::handle_check_page(
                &url,
                &expect,
                timeout.unwrap_or(config.page_timeout_secs),
                interval,
            )
            .await?
        }
        Commands::Juju { command, args } => {
            let env = environment(&config)?;
            commands::juju::handle_juju(&env, &command, &args).await?
        }
        Commands::Config { command } => {
            commands::config::handle_config_command(command, &config, output_format)?
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Environment selected by flag, JUJU_ENV or the config file
fn environment(config: &config::Config) -> Result<Environment> {
    let Some(ref name) = config.default_environment else {
        anyhow::bail!(
            "No environment given: pass --environment, set JUJU_ENV, or set default_environment in {}",
            config::Config::config_path()?.display()
        );
    };
    Ok(Environment::new(name.clone()).with_binary(&config.juju_binary))
}

/// Generate shell completions
fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
}
