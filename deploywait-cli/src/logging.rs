///! Logging configuration module
///! Console logging on stderr, optionally JSON, plus an optional rolling log file

use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,             // log level (trace, debug, info, warn, error)
    pub file_path: Option<PathBuf>, // log file, rotated daily
    pub json_format: bool,         // use JSON formatting on the console
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Level after applying `-v` flags on top of the configured one
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        match verbose {
            0 => {}
            1 => self.level = "debug".to_string(),
            _ => self.level = "trace".to_string(),
        }
        self
    }

    /// Initialize logging. The returned guard flushes the log file on drop
    /// and must be held until the process exits.
    pub fn init(&self) -> anyhow::Result<Option<WorkerGuard>> {
        // RUST_LOG wins over the configured level
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))?;

        let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

        if self.json_format {
            layers.push(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(io::stderr)
                    .boxed(),
            );
        } else {
            layers.push(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(io::stderr)
                    .boxed(),
            );
        }

        let mut guard = None;
        if let Some(ref path) = self.file_path {
            let (directory, file_name) = split_log_path(path);
            let file_appender = rolling::daily(directory, file_name);
            let (writer, file_guard) = non_blocking(file_appender);

            layers.push(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false)
                    .json()
                    .with_writer(writer)
                    .boxed(),
            );
            guard = Some(file_guard);
        }

        tracing_subscriber::registry()
            .with(layers)
            .with(env_filter)
            .try_init()?;

        tracing::debug!("Logging initialized - level: {}", self.level);

        Ok(guard)
    }
}

/// Directory and file name prefix for the rolling appender
fn split_log_path(path: &Path) -> (PathBuf, String) {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "deploywait.log".to_string());
    (directory, file_name)
}
