///! CLI configuration management

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_environment: Option<String>,
    pub juju_binary: String,
    pub start_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub page_timeout_secs: u64,
    pub default_output: OutputFormat,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_environment: None,
            juju_binary: deploywait_common::environment::DEFAULT_JUJU_BINARY.to_string(),
            start_timeout_secs: 300,
            poll_interval_secs: 1,
            page_timeout_secs: 30,
            default_output: OutputFormat::Table,
            log_level: "info".to_string(),
            log_file: None,
            log_json: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        Ok(PathBuf::from(home).join(".config/deploywait/cli.toml"))
    }
}
