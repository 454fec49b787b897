#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Authoritative key-value storage for trust-receive
//!
//! The store maps a namespaced dedup key to the first fingerprint recorded for
//! it. Entries never expire. Backends only need `get`/`set`; first-write-wins
//! is enforced by the verification engine, which never writes a conflicting
//! fingerprint.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use tr_errors::Error;

/// Namespace prepended to every dedup key
pub const DEFAULT_KEY_PREFIX: &str = "file:";

/// Key-value backend consumed by the verification engine.
#[async_trait::async_trait]
pub trait PersistentStore: Send + Sync {
    /// Store `value` under `key`, replacing any existing value.
    async fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Fetch the value under `key`. A missing key is `Ok(None)`; `Err` is
    /// reserved for backend failures.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// All keys starting with `prefix`, in no particular order. Used to
    /// rebuild in-process filters over a store that outlives the process.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, Error>;
}

/// Build the namespaced store key for a hex dedup key
#[must_use]
pub fn store_key(prefix: &str, key: &str) -> String {
    format!("{prefix}{key}")
}
