//! Conflict alert delivery

use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tr_errors::{AlertError, Error};

/// Destination for conflict notifications.
///
/// Called at most once per detected conflict and never retried. A returned
/// error is logged by the caller and does not change the verification result.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn alert(&self, message: &str) -> Result<(), Error>;
}

/// Writes alerts to the tracing log at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlerter;

#[async_trait]
impl AlertSink for LogAlerter {
    async fn alert(&self, message: &str) -> Result<(), Error> {
        tracing::error!(target: "trust_receive::alert", "ALERT TRIGGERED: {message}");
        Ok(())
    }
}

/// Discards alerts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAlerter;

#[async_trait]
impl AlertSink for NoopAlerter {
    async fn alert(&self, _message: &str) -> Result<(), Error> {
        Ok(())
    }
}

/// Runs an external program per alert, passing the message as its last
/// argument.
#[derive(Debug, Clone)]
pub struct CommandAlerter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandAlerter {
    /// Default time a notification command may run
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Build from an argv-style list; the first element is the program.
    ///
    /// # Errors
    ///
    /// Returns an error if `argv` is empty.
    pub fn from_argv(argv: &[String]) -> Result<Self, Error> {
        let (program, args) = argv.split_first().ok_or_else(|| AlertError::DispatchFailed {
            message: "alert command is empty".to_string(),
        })?;
        Ok(Self::new(program.clone()).with_args(args.iter().cloned()))
    }

    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(args);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl AlertSink for CommandAlerter {
    async fn alert(&self, message: &str) -> Result<(), Error> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(message).kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|e| AlertError::CommandFailed {
                command: self.program.clone(),
                message: e.to_string(),
            })?,
            Err(_) => {
                return Err(AlertError::CommandTimeout {
                    command: self.program.clone(),
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                }
                .into());
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AlertError::CommandFailed {
                command: self.program.clone(),
                message: format!("exited with {}: {}", output.status, stderr.trim()),
            }
            .into());
        }

        tracing::debug!(command = %self.program, "alert command delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_and_noop_alerters_succeed() {
        LogAlerter.alert("CRITICAL: test").await.unwrap();
        NoopAlerter.alert("CRITICAL: test").await.unwrap();
    }

    #[test]
    fn test_from_argv() {
        let argv = vec!["notify".to_string(), "--team".to_string(), "cdn".to_string()];
        let alerter = CommandAlerter::from_argv(&argv).unwrap();
        assert_eq!(alerter.program(), "notify");
        assert_eq!(alerter.args, vec!["--team", "cdn"]);
        assert!(CommandAlerter::from_argv(&[]).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_alerter_exit_status() {
        CommandAlerter::new("true").alert("msg").await.unwrap();

        let err = CommandAlerter::new("false").alert("msg").await.unwrap_err();
        assert!(matches!(err, Error::Alert(AlertError::CommandFailed { .. })));
    }

    #[tokio::test]
    async fn test_command_alerter_missing_program() {
        let err = CommandAlerter::new("/nonexistent/tr-alert-hook")
            .alert("msg")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Alert(AlertError::CommandFailed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_alerter_timeout() {
        let alerter = CommandAlerter::new("sleep")
            .with_args(["5".to_string()])
            .with_timeout(Duration::from_millis(50));
        let err = alerter.alert("1").await.unwrap_err();
        assert!(matches!(err, Error::Alert(AlertError::CommandTimeout { .. })));
    }
}
