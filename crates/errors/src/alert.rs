//! Alert dispatch error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum AlertError {
    #[error("alert dispatch failed: {message}")]
    DispatchFailed { message: String },

    #[error("alert command {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("alert command {command} timed out after {timeout_ms}ms")]
    CommandTimeout { command: String, timeout_ms: u64 },
}

impl UserFacingError for AlertError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::DispatchFailed { .. } => "alert.dispatch_failed",
            Self::CommandFailed { .. } => "alert.command_failed",
            Self::CommandTimeout { .. } => "alert.command_timeout",
        };
        Some(code)
    }
}
