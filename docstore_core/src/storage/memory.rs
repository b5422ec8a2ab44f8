//! In-memory object store, used as the development fallback backend and in
//! tests. A `BTreeMap` keeps keys in lexicographic order, matching the
//! listing order of S3-compatible providers.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::object_store::{ObjectMeta, ObjectStore, StoredObject};

#[derive(Debug, Clone)]
struct StoredEntry {
    data: Vec<u8>,
    content_type: String,
    last_modified: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct InMemoryObjectStore {
    objects: Arc<RwLock<BTreeMap<String, StoredEntry>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn list_objects(&self, prefix: &str, max_keys: usize) -> Result<Vec<StoredObject>> {
        let objects = self.objects.read();
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .take(max_keys)
            .map(|(key, entry)| StoredObject {
                key: key.clone(),
                size: entry.data.len() as u64,
                last_modified: entry.last_modified,
            })
            .collect())
    }

    async fn put_object(&self, key: &str, content_type: &str, data: &[u8]) -> Result<()> {
        self.objects.write().insert(
            key.to_string(),
            StoredEntry {
                data: data.to_vec(),
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.objects.write().remove(key);
        Ok(())
    }

    async fn head_object(&self, key: &str) -> Result<Option<ObjectMeta>> {
        Ok(self.objects.read().get(key).map(|entry| ObjectMeta {
            content_length: entry.data.len() as u64,
            content_type: Some(entry.content_type.clone()),
            last_modified: Some(entry.last_modified),
        }))
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String> {
        // Not a signed link; good enough for local development.
        Ok(format!("memory:///{}?expires_in={}", key, expiry_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_respects_prefix_and_order() {
        let store = InMemoryObjectStore::new();
        store.put_object("bob/b.txt", "text/plain", b"b").await.unwrap();
        store.put_object("alice/2.txt", "text/plain", b"2").await.unwrap();
        store.put_object("alice/1.txt", "text/plain", b"1").await.unwrap();

        let listed = store.list_objects("alice/", 1000).await.unwrap();
        let keys: Vec<_> = listed.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["alice/1.txt", "alice/2.txt"]);
    }

    #[tokio::test]
    async fn test_list_caps_results() {
        let store = InMemoryObjectStore::new();
        for i in 0..5 {
            let key = format!("u/{}.txt", i);
            store.put_object(&key, "text/plain", b"x").await.unwrap();
        }

        let listed = store.list_objects("u/", 3).await.unwrap();
        assert_eq!(listed.len(), 3);
    }

    #[tokio::test]
    async fn test_head_missing_is_none() {
        let store = InMemoryObjectStore::new();
        assert!(store.head_object("nope/absent.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = InMemoryObjectStore::new();
        store.put_object("u/f.txt", "text/plain", b"one").await.unwrap();
        store.put_object("u/f.txt", "text/plain", b"three").await.unwrap();

        let meta = store.head_object("u/f.txt").await.unwrap().unwrap();
        assert_eq!(meta.content_length, 5);
        assert_eq!(store.object_count(), 1);
    }
}
