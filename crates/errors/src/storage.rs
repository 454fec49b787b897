//! Persistent store error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum StoreError {
    #[error("failed to write {key}: {message}")]
    WriteFailed { key: String, message: String },

    /// Infrastructure failure while reading. A missing key is not an error.
    #[error("failed to read {key}: {message}")]
    ReadFailed { key: String, message: String },

    #[error("failed to open store at {location}: {message}")]
    OpenFailed { location: String, message: String },

    #[error("corrupted data: {message}")]
    CorruptedData { message: String },
}

impl StoreError {
    /// Build a read failure from any displayable backend error.
    pub fn read(key: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::ReadFailed {
            key: key.into(),
            message: err.to_string(),
        }
    }

    /// Build a write failure from any displayable backend error.
    pub fn write(key: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::WriteFailed {
            key: key.into(),
            message: err.to_string(),
        }
    }
}

impl UserFacingError for StoreError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::WriteFailed { .. } | Self::ReadFailed { .. } => {
                Some("The key-value store is unavailable; retry the report later.")
            }
            Self::OpenFailed { .. } => {
                Some("Check the store backend and path in the configuration.")
            }
            Self::CorruptedData { .. } => {
                Some("A stored value is not a valid fingerprint; purge the key and retry.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::WriteFailed { .. } | Self::ReadFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::WriteFailed { .. } => "store.write_failed",
            Self::ReadFailed { .. } => "store.read_failed",
            Self::OpenFailed { .. } => "store.open_failed",
            Self::CorruptedData { .. } => "store.corrupted_data",
        };
        Some(code)
    }
}
