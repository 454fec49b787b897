//! Component wiring from configuration

use std::sync::Arc;

use tr_config::{Config, StoreBackend};
use tr_errors::Error;
use tr_events::EventSender;
use tr_filter::BloomFilter;
use tr_store::{MemoryStore, PersistentStore, SqliteStore};
use tr_verify::{AlertSink, CommandAlerter, LogAlerter, VerificationEngine};

/// Engine plus the handles that need explicit shutdown
pub struct Components {
    pub engine: VerificationEngine,
    sqlite: Option<Arc<SqliteStore>>,
}

impl Components {
    /// Build every component named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter sizing is invalid, the store cannot be
    /// opened or scanned, or the alert command is malformed.
    pub async fn build(config: &Config, tx: EventSender) -> Result<Self, Error> {
        let filter = BloomFilter::with_estimates(config.filter.capacity, config.filter.fp_rate)?;
        tracing::info!(
            capacity = config.filter.capacity,
            fp_rate = config.filter.fp_rate,
            bits = filter.num_bits(),
            hashes = filter.num_hashes(),
            "membership filter ready"
        );

        let mut sqlite = None;
        let store: Arc<dyn PersistentStore> = match config.store.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Sqlite => {
                let path = config.store_path();
                let opened = Arc::new(SqliteStore::open(&path).await?);
                tracing::info!(path = %path.display(), "sqlite store opened");
                sqlite = Some(Arc::clone(&opened));
                opened
            }
        };

        let alerter: Arc<dyn AlertSink> = match &config.alert.command {
            Some(argv) => Arc::new(
                CommandAlerter::from_argv(argv)?.with_timeout(config.alert_timeout()),
            ),
            None => Arc::new(LogAlerter),
        };

        let mut builder = VerificationEngine::builder()
            .with_filter(Arc::new(filter))
            .with_store(store)
            .with_alerter(alerter)
            .with_event_sender(tx)
            .with_key_prefix(config.store.key_prefix.clone());
        if let Some(deadline) = config.deadline() {
            builder = builder.with_deadline(deadline);
        }

        let engine = builder.build()?;
        if sqlite.is_some() {
            engine.warm_filter().await?;
        }

        Ok(Self { engine, sqlite })
    }

    /// Close backend connections.
    pub async fn shutdown(self) {
        if let Some(sqlite) = self.sqlite {
            sqlite.close().await;
        }
    }
}
