use serde::{Deserialize, Serialize};

use crate::{EventLevel, EventSource};
use tr_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short caller-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod general;
pub mod verify;

pub use general::*;
pub use verify::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Report verification events
    Verify(VerifyEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Verify(VerifyEvent::AlertFailed { .. }) => EventSource::ALERT,
            Self::Verify(_) => EventSource::VERIFY,
        }
    }

    /// Severity recorded in the event metadata.
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::Verify(VerifyEvent::ConflictDetected { .. } | VerifyEvent::Failed { .. }) => {
                EventLevel::Error
            }
            Self::General(GeneralEvent::Warning { .. })
            | Self::Verify(VerifyEvent::AlertFailed { .. }) => EventLevel::Warn,
            Self::Verify(VerifyEvent::Confirmed { .. }) => EventLevel::Debug,
            _ => EventLevel::Info,
        }
    }
}
