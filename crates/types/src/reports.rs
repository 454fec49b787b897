//! Report type definitions for verification

use serde::{Deserialize, Serialize};
use std::fmt;

/// One inbound claim about a resource version and its content.
///
/// Field aliases accept the short names used by the reporting agents
/// (`cl` for content length, `lm` for Last-Modified).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub url: String,
    pub hash: String,
    #[serde(alias = "cl", alias = "file_size")]
    pub size: u64,
    #[serde(alias = "lm", alias = "lastModified")]
    pub last_modified: String,
}

impl FileReport {
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        hash: impl Into<String>,
        size: u64,
        last_modified: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            hash: hash.into(),
            size,
            last_modified: last_modified.into(),
        }
    }
}

/// Terminal state of a single verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// First sighting of the resource version; fingerprint recorded.
    New,
    /// Matches the stored fingerprint.
    Confirmed,
    /// Filter claimed the key but the store had no entry; recorded now.
    RecoveredFalsePositive,
    /// Differs from the stored fingerprint. Surfaced to callers as an error.
    Conflict,
}

impl VerifyOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Confirmed => "confirmed",
            Self::RecoveredFalsePositive => "recovered_false_positive",
            Self::Conflict => "conflict",
        }
    }

    /// Whether the report was accepted.
    #[must_use]
    pub fn is_accepted(self) -> bool {
        !matches!(self, Self::Conflict)
    }
}

impl fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details of a detected conflict, shared by metrics, events and alerts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub url: String,
    pub last_modified: String,
    /// Fingerprint already authoritative for the key, hex encoded.
    pub stored: String,
    /// Fingerprint derived from the rejected report, hex encoded.
    pub reported: String,
    pub size: u64,
}

impl ConflictRecord {
    /// Human-readable alert text.
    #[must_use]
    pub fn alert_message(&self) -> String {
        format!(
            "CRITICAL: File inconsistency detected for URL: {} (LM: {}) Stored: [Hash: {}] Reported: [Hash: {}, Size: {}]",
            self.url, self.last_modified, self.stored, self.reported, self.size
        )
    }
}

impl From<ConflictRecord> for tr_errors::VerifyError {
    fn from(record: ConflictRecord) -> Self {
        Self::Conflict {
            url: record.url,
            last_modified: record.last_modified,
            stored: record.stored,
            reported: record.reported,
            size: record.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_accepts_agent_field_names() {
        let json = r#"{"url":"https://example.com/a.txt","hash":"hash1","cl":100,"lm":"2023-01-01"}"#;
        let report: FileReport = serde_json::from_str(json).unwrap();
        assert_eq!(
            report,
            FileReport::new("https://example.com/a.txt", "hash1", 100, "2023-01-01")
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&VerifyOutcome::RecoveredFalsePositive).unwrap();
        assert_eq!(json, "\"recovered_false_positive\"");
        assert!(!VerifyOutcome::Conflict.is_accepted());
        assert!(VerifyOutcome::Confirmed.is_accepted());
    }

    #[test]
    fn test_alert_message_names_both_fingerprints() {
        let record = ConflictRecord {
            url: "https://example.com/a.txt".into(),
            last_modified: "2023-01-01".into(),
            stored: "aaaa".into(),
            reported: "bbbb".into(),
            size: 100,
        };
        let msg = record.alert_message();
        assert!(msg.contains("https://example.com/a.txt"));
        assert!(msg.contains("aaaa"));
        assert!(msg.contains("bbbb"));
    }
}
