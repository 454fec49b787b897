//! Integration tests for store crate

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tempfile::tempdir;
    use tr_store::*;

    #[tokio::test]
    async fn test_sqlite_store_roundtrip() {
        let temp = tempdir().unwrap();
        let store = SqliteStore::open(&temp.path().join("db").join("trust.sqlite"))
            .await
            .unwrap();

        assert!(store.get("file:missing").await.unwrap().is_none());

        store.set("file:k1", "fp1").await.unwrap();
        assert_eq!(store.get("file:k1").await.unwrap().as_deref(), Some("fp1"));

        // Same-value rewrites are idempotent.
        store.set("file:k1", "fp1").await.unwrap();
        assert_eq!(store.get("file:k1").await.unwrap().as_deref(), Some("fp1"));
        store.close().await;
    }

    #[tokio::test]
    async fn test_sqlite_store_persists_across_reopen() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("trust.sqlite");

        let store = SqliteStore::open(&path).await.unwrap();
        store.set("file:k1", "fp1").await.unwrap();
        store.close().await;

        let reopened = SqliteStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("file:k1").await.unwrap().as_deref(), Some("fp1"));
        reopened.close().await;
    }

    #[tokio::test]
    async fn test_sqlite_keys_with_prefix() {
        let temp = tempdir().unwrap();
        let store = SqliteStore::open(&temp.path().join("trust.sqlite"))
            .await
            .unwrap();

        store.set("file:k1", "fp1").await.unwrap();
        store.set("file:k2", "fp2").await.unwrap();
        store.set("cdn:k3", "fp3").await.unwrap();

        let mut keys = store.keys_with_prefix("file:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["file:k1", "file:k2"]);
        assert_eq!(store.keys_with_prefix("").await.unwrap().len(), 3);
        store.close().await;
    }

    #[tokio::test]
    async fn test_stores_behind_trait_objects() {
        let temp = tempdir().unwrap();
        let stores: Vec<Arc<dyn PersistentStore>> = vec![
            Arc::new(MemoryStore::new()),
            Arc::new(SqliteStore::open(&temp.path().join("t.sqlite")).await.unwrap()),
        ];
        for store in stores {
            let key = store_key(DEFAULT_KEY_PREFIX, "abc");
            store.set(&key, "v").await.unwrap();
            assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("v"));
            assert!(store.get("abc").await.unwrap().is_none());
        }
    }
}
