//! Object-storage collaborator contract consumed by the facade.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One entry from a listing call.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Metadata returned by a head call.
#[derive(Debug, Clone)]
pub struct ObjectMeta {
    pub content_length: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Backend seam over an S3-compatible object store.
///
/// The facade performs one call at a time against this trait; all durability,
/// listing-order, and link-signing guarantees come from the implementation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists up to `max_keys` objects whose key starts with `prefix`, in the
    /// provider's listing order. A single backend call; no continuation.
    async fn list_objects(&self, prefix: &str, max_keys: usize) -> Result<Vec<StoredObject>>;

    /// Writes `data` as a single atomic put, silently overwriting any
    /// existing object at `key`.
    async fn put_object(&self, key: &str, content_type: &str, data: &[u8]) -> Result<()>;

    async fn delete_object(&self, key: &str) -> Result<()>;

    /// `Ok(None)` means the backend definitively reported the key absent;
    /// `Err` means the check itself failed.
    async fn head_object(&self, key: &str) -> Result<Option<ObjectMeta>>;

    /// Produces a time-limited retrieval URL for `key`.
    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String>;
}
