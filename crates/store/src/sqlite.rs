//! `SQLite`-backed store

use crate::PersistentStore;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{query, Pool, Row, Sqlite};
use std::path::Path;
use std::time::Duration;
use tr_errors::{Error, StoreError};

/// Durable store keeping entries in a single `kv` table.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created, the
    /// connection fails, or the table cannot be created.
    pub async fn open(db_path: &Path) -> Result<Self, Error> {
        let open_failed = |message: String| StoreError::OpenFailed {
            location: db_path.display().to_string(),
            message,
        };

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| open_failed(e.to_string()))?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| open_failed(e.to_string()))?;

        query("CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY NOT NULL, value TEXT NOT NULL)")
            .execute(&pool)
            .await
            .map_err(|e| open_failed(e.to_string()))?;

        tracing::info!(path = %db_path.display(), "opened sqlite store");
        Ok(Self { pool })
    }

    /// Close the pool, waiting for in-flight queries.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl PersistentStore for SqliteStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        query(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::write(key, e))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let row = query("SELECT value FROM kv WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::read(key, e))?;

        match row {
            Some(r) => {
                let value: String = r.try_get("value").map_err(|e| StoreError::read(key, e))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, Error> {
        let rows = query("SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1")
            .bind(prefix)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::read(prefix, e))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("key")
                    .map_err(|e| StoreError::read(prefix, e).into())
            })
            .collect()
    }
}
