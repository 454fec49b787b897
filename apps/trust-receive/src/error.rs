//! CLI error handling

use std::fmt;

use tr_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(tr_errors::ConfigError),
    /// Setup or verification error
    Verify(tr_errors::Error),
    /// I/O error
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {e}"),
            CliError::Verify(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                Ok(())
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Verify(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<tr_errors::ConfigError> for CliError {
    fn from(e: tr_errors::ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<tr_errors::Error> for CliError {
    fn from(e: tr_errors::Error) -> Self {
        match e {
            tr_errors::Error::Config(config) => CliError::Config(config),
            other => CliError::Verify(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
