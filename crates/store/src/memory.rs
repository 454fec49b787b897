//! In-process store for tests and single-node runs

use crate::PersistentStore;
use dashmap::DashMap;
use tr_errors::Error;

/// Store held entirely in memory; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop an entry, as an administrative purge would.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.remove(key).map(|(_, value)| value)
    }
}

#[async_trait::async_trait]
impl PersistentStore for MemoryStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, Error> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_get_set() {
        let store = MemoryStore::new();
        assert!(store.get("file:a").await.unwrap().is_none());

        store.set("file:a", "fp1").await.unwrap();
        assert_eq!(store.get("file:a").await.unwrap().as_deref(), Some("fp1"));
        assert_eq!(store.len(), 1);

        store.set("other:b", "fp2").await.unwrap();
        assert_eq!(store.keys_with_prefix("file:").await.unwrap(), vec!["file:a"]);
        store.remove("other:b");

        assert_eq!(store.remove("file:a").as_deref(), Some("fp1"));
        assert!(store.is_empty());
    }
}
