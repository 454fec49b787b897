//! Verification outcome errors

use std::borrow::Cow;

use crate::{UserFacingError, VERIFY_FAILED};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum VerifyError {
    /// Two reports for the same resource version disagree on hash or size.
    #[error("file inconsistency for {url} (last-modified {last_modified}): stored {stored}, reported {reported}")]
    Conflict {
        url: String,
        last_modified: String,
        stored: String,
        reported: String,
        size: u64,
    },
}

impl UserFacingError for VerifyError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Conflict { .. } => Some(
                "Another report for this URL and Last-Modified carried a different hash or size.",
            ),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::Conflict { .. } => Some(VERIFY_FAILED),
        }
    }
}
