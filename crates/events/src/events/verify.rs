use serde::{Deserialize, Serialize};
use tr_types::{ConflictRecord, VerifyOutcome};

/// Verification events, one per terminal outcome plus alert dispatch failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerifyEvent {
    /// First fingerprint recorded for a resource version.
    VersionRecorded {
        url: String,
        last_modified: String,
        fingerprint: String,
        size: u64,
    },

    /// Report matched the stored fingerprint.
    Confirmed { url: String, last_modified: String },

    /// Filter hit with no store entry; the fingerprint was recorded.
    FalsePositiveRecovered {
        url: String,
        last_modified: String,
        fingerprint: String,
    },

    /// Report disagreed with the stored fingerprint.
    ConflictDetected { conflict: ConflictRecord },

    /// Verification could not complete (store failure or deadline).
    Failed {
        url: String,
        last_modified: String,
        failure: super::FailureContext,
    },

    /// Conflict alert could not be delivered. The conflict still stands.
    AlertFailed {
        url: String,
        failure: super::FailureContext,
    },
}

impl VerifyEvent {
    /// Outcome represented by this event, if it is terminal.
    #[must_use]
    pub fn outcome(&self) -> Option<VerifyOutcome> {
        match self {
            Self::VersionRecorded { .. } => Some(VerifyOutcome::New),
            Self::Confirmed { .. } => Some(VerifyOutcome::Confirmed),
            Self::FalsePositiveRecovered { .. } => Some(VerifyOutcome::RecoveredFalsePositive),
            Self::ConflictDetected { .. } => Some(VerifyOutcome::Conflict),
            Self::Failed { .. } | Self::AlertFailed { .. } => None,
        }
    }
}
