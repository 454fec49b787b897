//! Structured logging for engine events
//!
//! The engine reports outcomes only as events; this module is where they
//! become tracing records.

use tr_events::{AppEvent, EventMessage, EventReceiver, GeneralEvent, VerifyEvent};
use tracing::{debug, error, info, warn};

/// Drain the event channel until every sender is dropped.
pub async fn forward_events(mut rx: EventReceiver) {
    while let Some(message) = rx.recv().await {
        log_event_with_tracing(&message);
    }
}

/// Log an `EventMessage` with structured fields at its own level
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    match &message.event {
        AppEvent::Verify(event) => match event {
            VerifyEvent::VersionRecorded {
                url,
                last_modified,
                fingerprint,
                size,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    url = %url,
                    last_modified = %last_modified,
                    fingerprint = %fingerprint,
                    size = size,
                    "recorded new version"
                );
            }
            VerifyEvent::Confirmed { url, last_modified } => {
                debug!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    url = %url,
                    last_modified = %last_modified,
                    "fingerprint confirmed"
                );
            }
            VerifyEvent::FalsePositiveRecovered {
                url,
                last_modified,
                fingerprint,
            } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    url = %url,
                    last_modified = %last_modified,
                    fingerprint = %fingerprint,
                    "filter false positive recovered"
                );
            }
            VerifyEvent::ConflictDetected { conflict } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    url = %conflict.url,
                    last_modified = %conflict.last_modified,
                    stored = %conflict.stored,
                    reported = %conflict.reported,
                    size = conflict.size,
                    "fingerprint conflict detected"
                );
            }
            VerifyEvent::Failed {
                url,
                last_modified,
                failure,
            } => {
                warn!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    url = %url,
                    last_modified = %last_modified,
                    code = ?failure.code,
                    retryable = failure.retryable,
                    "verification failed: {}",
                    failure.message
                );
            }
            VerifyEvent::AlertFailed { url, failure } => {
                warn!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    url = %url,
                    code = ?failure.code,
                    "failed to deliver conflict alert: {}",
                    failure.message
                );
            }
        },
        AppEvent::General(event) => match event {
            GeneralEvent::Warning { message, .. } => {
                warn!(source = meta.source.as_str(), "{message}");
            }
            other => {
                debug!(source = meta.source.as_str(), event = ?other, "general event");
            }
        },
    }
}
