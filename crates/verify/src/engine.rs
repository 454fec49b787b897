//! Verification engine: filter fast path, store reconciliation, conflict handling

use std::sync::Arc;
use std::time::Duration;

use tr_errors::{ConfigError, Error, VerifyError};
use tr_events::{EventEmitter, EventSender, FailureContext, VerifyEvent};
use tr_filter::{FilterStats, MembershipFilter};
use tr_hash::{DedupKey, Fingerprint};
use tr_store::{store_key, PersistentStore, DEFAULT_KEY_PREFIX};
use tr_types::{ConflictRecord, FileReport, VerifyOutcome};

use crate::alert::{AlertSink, LogAlerter};
use crate::metrics::ConflictMetrics;

/// Result of the store phase, before conflict side effects run.
enum Decision {
    New,
    RecoveredFalsePositive,
    Confirmed,
    Conflict { stored: Fingerprint },
}

/// Verifies reports against the first fingerprint recorded for their
/// resource version.
///
/// Shared across tasks behind an `Arc`. The filter is consulted before any
/// store I/O and no lock is held while awaiting the store. Outcomes are
/// reported as [`VerifyEvent`]s on the configured sender rather than logged.
pub struct VerificationEngine {
    filter: Arc<dyn MembershipFilter>,
    store: Arc<dyn PersistentStore>,
    alerter: Arc<dyn AlertSink>,
    metrics: Arc<ConflictMetrics>,
    tx: Option<EventSender>,
    key_prefix: String,
    deadline: Option<Duration>,
}

impl std::fmt::Debug for VerificationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationEngine")
            .field("key_prefix", &self.key_prefix)
            .field("deadline", &self.deadline)
            .field("filter", &self.filter.stats())
            .finish_non_exhaustive()
    }
}

impl EventEmitter for VerificationEngine {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl VerificationEngine {
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Verify a report using the engine's default deadline, if any.
    ///
    /// Returns the accepted outcome. A conflicting report yields
    /// `Error::Verify(VerifyError::Conflict)` after the conflict has been
    /// counted and alerted.
    ///
    /// # Errors
    ///
    /// Returns an error for a store read or write failure, an expired
    /// deadline, a corrupted stored value, or a conflict.
    pub async fn verify(&self, report: &FileReport) -> Result<VerifyOutcome, Error> {
        self.run(report, self.deadline).await
    }

    /// Verify a report, bounding the store I/O by `deadline`.
    ///
    /// On expiry the key may already be marked in the filter without a store
    /// entry; the next report for it is then recorded as a recovered false
    /// positive.
    ///
    /// # Errors
    ///
    /// Same as [`Self::verify`], plus `Error::DeadlineExceeded` on expiry.
    pub async fn verify_with_deadline(
        &self,
        report: &FileReport,
        deadline: Duration,
    ) -> Result<VerifyOutcome, Error> {
        self.run(report, Some(deadline)).await
    }

    /// Mark every key already in the store as seen by the filter.
    ///
    /// Needed when the store outlives the process: without it, a fresh filter
    /// would treat a known version as new and overwrite its fingerprint.
    /// Returns the number of keys loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot list its keys or a stored key is
    /// not a valid dedup key.
    pub async fn warm_filter(&self) -> Result<u64, Error> {
        let keys = self.store.keys_with_prefix(&self.key_prefix).await?;
        let mut loaded = 0u64;
        for namespaced in &keys {
            let hex = namespaced
                .strip_prefix(self.key_prefix.as_str())
                .unwrap_or(namespaced);
            let key = DedupKey::from_hex(hex)?;
            self.filter.test_or_add(key.as_bytes());
            loaded += 1;
        }
        tracing::info!(keys = loaded, "membership filter warmed from store");
        Ok(loaded)
    }

    #[must_use]
    pub fn metrics(&self) -> &Arc<ConflictMetrics> {
        &self.metrics
    }

    #[must_use]
    pub fn filter_stats(&self) -> FilterStats {
        self.filter.stats()
    }

    async fn run(
        &self,
        report: &FileReport,
        deadline: Option<Duration>,
    ) -> Result<VerifyOutcome, Error> {
        let key = DedupKey::for_report(report);
        let fingerprint = Fingerprint::for_report(report);
        let key_hex = key.to_hex();
        let namespaced = store_key(&self.key_prefix, &key_hex);

        let seen = self.filter.test_or_add(key.as_bytes());

        let reconcile = self.reconcile(&namespaced, fingerprint, seen);
        let decision = match deadline {
            Some(limit) => match tokio::time::timeout(limit, reconcile).await {
                Ok(result) => result,
                Err(_) => Err(Error::DeadlineExceeded {
                    operation: "store reconciliation".to_string(),
                    timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                }),
            },
            None => reconcile.await,
        };

        let decision = match decision {
            Ok(decision) => decision,
            Err(err) => {
                self.emit_verify(
                    key_hex,
                    VerifyEvent::Failed {
                        url: report.url.clone(),
                        last_modified: report.last_modified.clone(),
                        failure: FailureContext::from_error(&err),
                    },
                );
                return Err(err);
            }
        };

        let url = report.url.clone();
        let last_modified = report.last_modified.clone();
        let (outcome, event) = match decision {
            Decision::New => (
                VerifyOutcome::New,
                VerifyEvent::VersionRecorded {
                    url,
                    last_modified,
                    fingerprint: fingerprint.to_hex(),
                    size: report.size,
                },
            ),
            Decision::RecoveredFalsePositive => (
                VerifyOutcome::RecoveredFalsePositive,
                VerifyEvent::FalsePositiveRecovered {
                    url,
                    last_modified,
                    fingerprint: fingerprint.to_hex(),
                },
            ),
            Decision::Confirmed => (
                VerifyOutcome::Confirmed,
                VerifyEvent::Confirmed { url, last_modified },
            ),
            Decision::Conflict { stored } => {
                let record = ConflictRecord {
                    url,
                    last_modified,
                    stored: stored.to_hex(),
                    reported: fingerprint.to_hex(),
                    size: report.size,
                };
                self.handle_conflict(&key_hex, &record).await;
                return Err(VerifyError::from(record).into());
            }
        };

        self.emit_verify(key_hex, event);
        Ok(outcome)
    }

    /// Store phase. Never overwrites an existing, differing fingerprint.
    async fn reconcile(
        &self,
        key: &str,
        fingerprint: Fingerprint,
        seen: bool,
    ) -> Result<Decision, Error> {
        if !seen {
            self.store.set(key, &fingerprint.to_hex()).await?;
            return Ok(Decision::New);
        }

        match self.store.get(key).await? {
            None => {
                self.store.set(key, &fingerprint.to_hex()).await?;
                Ok(Decision::RecoveredFalsePositive)
            }
            Some(value) => {
                let stored = Fingerprint::from_hex(&value)?;
                if stored == fingerprint {
                    Ok(Decision::Confirmed)
                } else {
                    Ok(Decision::Conflict { stored })
                }
            }
        }
    }

    async fn handle_conflict(&self, key_hex: &str, record: &ConflictRecord) {
        self.metrics.record(record);
        self.emit_verify(
            key_hex,
            VerifyEvent::ConflictDetected {
                conflict: record.clone(),
            },
        );

        // Delivery failure is reported as an event and otherwise ignored.
        if let Err(err) = self.alerter.alert(&record.alert_message()).await {
            self.emit_verify(
                key_hex,
                VerifyEvent::AlertFailed {
                    url: record.url.clone(),
                    failure: FailureContext::from_error(&err),
                },
            );
        }
    }
}

/// Builder for [`VerificationEngine`]
#[derive(Default)]
pub struct EngineBuilder {
    filter: Option<Arc<dyn MembershipFilter>>,
    store: Option<Arc<dyn PersistentStore>>,
    alerter: Option<Arc<dyn AlertSink>>,
    metrics: Option<Arc<ConflictMetrics>>,
    tx: Option<EventSender>,
    key_prefix: Option<String>,
    deadline: Option<Duration>,
}

impl EngineBuilder {
    /// Create new engine builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set membership filter
    #[must_use]
    pub fn with_filter(mut self, filter: Arc<dyn MembershipFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set persistent store
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set alert sink (defaults to [`LogAlerter`])
    #[must_use]
    pub fn with_alerter(mut self, alerter: Arc<dyn AlertSink>) -> Self {
        self.alerter = Some(alerter);
        self
    }

    /// Share an existing metrics registry
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<ConflictMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Set store key namespace (defaults to `file:`)
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Deadline applied by [`VerificationEngine::verify`]
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Build the engine
    ///
    /// # Errors
    ///
    /// Returns an error if the filter or store is missing.
    pub fn build(self) -> Result<VerificationEngine, Error> {
        let filter = self.filter.ok_or_else(|| missing("filter"))?;
        let store = self.store.ok_or_else(|| missing("store"))?;

        Ok(VerificationEngine {
            filter,
            store,
            alerter: self.alerter.unwrap_or_else(|| Arc::new(LogAlerter)),
            metrics: self.metrics.unwrap_or_default(),
            tx: self.tx,
            key_prefix: self
                .key_prefix
                .unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string()),
            deadline: self.deadline,
        })
    }
}

fn missing(component: &str) -> Error {
    ConfigError::Invalid {
        message: format!("verification engine is missing its {component}"),
    }
    .into()
}
