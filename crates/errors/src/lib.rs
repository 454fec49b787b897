#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for trust-receive
//!
//! This crate provides fine-grained error types organized by domain.
//! Only store writes, store reads and verification conflicts ever surface to
//! the caller of a verification; alert failures are captured and logged.

use std::borrow::Cow;

use thiserror::Error;

pub mod alert;
pub mod config;
pub mod storage;
pub mod verify;

// Re-export all error types at the root
pub use alert::AlertError;
pub use config::ConfigError;
pub use storage::StoreError;
pub use verify::VerifyError;

/// Machine-readable code returned to ingress callers on a failed verification.
pub const VERIFY_FAILED: &str = "VERIFY_FAILED";

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("verification error: {0}")]
    Verify(#[from] VerifyError),

    #[error("alert error: {0}")]
    Alert(#[from] AlertError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("deadline of {timeout_ms}ms exceeded during {operation}")]
    DeadlineExceeded { operation: String, timeout_ms: u64 },

    #[error("invalid report: {0}")]
    InvalidReport(String),

}

impl Error {
    /// Whether this error is a detected fingerprint conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Verify(VerifyError::Conflict { .. }))
    }

    /// HTTP-equivalent status code for the ingress layer.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Verify(_) => 409,
            Self::Store(_) => 503,
            Self::DeadlineExceeded { .. } => 504,
            Self::InvalidReport(_) | Self::Config(_) => 400,
            Self::Alert(_) => 500,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidReport(format!("JSON error: {err}"))
    }
}

/// Result type alias for trust-receive operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering caller-facing error information.
pub trait UserFacingError {
    /// Short message suitable for a response body or CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Store(err) => err.user_message(),
            Error::Verify(err) => err.user_message(),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Store(err) => err.user_hint(),
            Error::Verify(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::DeadlineExceeded { .. } => Some("Retry the report; the store did not answer in time."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Store(err) => err.is_retryable(),
            Error::DeadlineExceeded { .. } => true,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Store(err) => err.user_code(),
            Error::Verify(err) => err.user_code(),
            Error::Alert(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::DeadlineExceeded { .. } => Some("error.deadline_exceeded"),
            Error::InvalidReport(_) => Some("error.invalid_report"),
        }
    }
}
