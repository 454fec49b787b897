//! JSON-lines report processing

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tr_errors::Error;
use tr_types::FileReport;
use tr_verify::VerificationEngine;

use crate::error::CliError;
use crate::output::{ReportResult, Summary};

/// Verify every report read from `reader` in order, handing each result to
/// `sink`. Blank lines are skipped; malformed lines produce an error result
/// and do not stop the run.
///
/// # Errors
///
/// Returns an error if reading the input or the sink fails.
pub async fn process_lines<R, F>(
    engine: &VerificationEngine,
    reader: R,
    mut sink: F,
) -> Result<Summary, CliError>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(&ReportResult) -> Result<(), CliError>,
{
    let mut summary = Summary::default();
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let result = match serde_json::from_str::<FileReport>(trimmed) {
            Ok(report) => match engine.verify(&report).await {
                Ok(outcome) => ReportResult::accepted(line_no, report.url, outcome),
                Err(err) => ReportResult::failed(line_no, Some(report.url), &err),
            },
            Err(err) => {
                let err = Error::from(err);
                tracing::warn!(line = line_no, error = %err, "skipping malformed report");
                ReportResult::failed(line_no, None, &err)
            }
        };

        summary.record(&result);
        sink(&result)?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tr_filter::ExactFilter;
    use tr_store::MemoryStore;
    use tr_types::VerifyOutcome;
    use tr_verify::NoopAlerter;

    #[tokio::test]
    async fn test_process_seed_reports() {
        let engine = VerificationEngine::builder()
            .with_filter(Arc::new(ExactFilter::new()))
            .with_store(Arc::new(MemoryStore::new()))
            .with_alerter(Arc::new(NoopAlerter))
            .build()
            .unwrap();

        let input = concat!(
            r#"{"url":"https://example.com/a.txt","hash":"hash1","size":100,"last_modified":"2023-01-01"}"#,
            "\n\n",
            r#"{"url":"https://example.com/a.txt","hash":"hash1","cl":100,"lm":"2023-01-01"}"#,
            "\n",
            r#"{"url":"https://example.com/a.txt","hash":"hash2","size":100,"last_modified":"2023-01-01"}"#,
            "\n",
            "not json\n",
        );

        let mut results = Vec::new();
        let summary = process_lines(&engine, input.as_bytes(), |result| {
            results.push((result.line, result.outcome, result.error.as_ref().map(|e| e.status)));
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(
            results,
            vec![
                (1, Some(VerifyOutcome::New), None),
                (3, Some(VerifyOutcome::Confirmed), None),
                (4, Some(VerifyOutcome::Conflict), Some(409)),
                (5, None, Some(400)),
            ]
        );
        assert_eq!(summary.conflict, 1);
        assert_eq!(summary.failed, 1);
    }
}
