//! Per-report results and the run summary

use serde::Serialize;
use tr_errors::{Error, UserFacingError};
use tr_types::VerifyOutcome;

/// One output line per input line
#[derive(Debug, Serialize)]
pub struct ReportResult {
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<VerifyOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Ingress-style error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        Self {
            status: err.http_status(),
            code: err.user_code().unwrap_or("error.unknown"),
            message: err.user_message().into_owned(),
            retryable: err.is_retryable(),
        }
    }
}

impl ReportResult {
    #[must_use]
    pub fn accepted(line: usize, url: String, outcome: VerifyOutcome) -> Self {
        Self {
            line,
            url: Some(url),
            outcome: Some(outcome),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(line: usize, url: Option<String>, err: &Error) -> Self {
        let outcome = err.is_conflict().then_some(VerifyOutcome::Conflict);
        Self {
            line,
            url,
            outcome,
            error: Some(ErrorBody::from(err)),
        }
    }
}

/// Outcome counts across a run
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct Summary {
    pub new: u64,
    pub confirmed: u64,
    pub recovered_false_positive: u64,
    pub conflict: u64,
    pub failed: u64,
}

impl Summary {
    pub fn record(&mut self, result: &ReportResult) {
        match result.outcome {
            Some(VerifyOutcome::New) => self.new += 1,
            Some(VerifyOutcome::Confirmed) => self.confirmed += 1,
            Some(VerifyOutcome::RecoveredFalsePositive) => self.recovered_false_positive += 1,
            Some(VerifyOutcome::Conflict) => self.conflict += 1,
            None => self.failed += 1,
        }
    }
}
