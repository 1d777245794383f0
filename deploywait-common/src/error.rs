///! Error type shared by every deploywait operation

/// Errors raised while polling an environment or a web page
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command `{command}` failed with {}: {stderr}", exit_label(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Cannot parse status output: {0}")]
    StatusParse(#[from] serde_yaml::Error),

    #[error("Unit {unit} is in state {state}")]
    ErroredUnit { unit: String, state: String },

    #[error("Timed out after {seconds}s waiting for {what}")]
    Timeout { what: String, seconds: u64 },

    #[error("Cannot get welcome screen at {url}")]
    PageUnavailable { url: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (killed by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errored_unit_message() {
        let err = Error::ErroredUnit {
            unit: "wordpress/0".to_string(),
            state: "install-error".to_string(),
        };
        assert_eq!(err.to_string(), "Unit wordpress/0 is in state install-error");
    }

    #[test]
    fn test_command_failed_message() {
        let err = Error::CommandFailed {
            command: "juju status -e local".to_string(),
            code: Some(1),
            stderr: "environment not bootstrapped".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command `juju status -e local` failed with exit code 1: environment not bootstrapped"
        );

        let killed = Error::CommandFailed {
            command: "juju status".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(killed.to_string().contains("killed by signal"));
    }
}
