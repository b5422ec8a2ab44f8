//! Storage facade: validation, namespaced listing/filtering/pagination, key
//! conventions, and best-effort download-link decoration over an
//! [`ObjectStore`] backend.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::{AppError, Result};

use super::models::{build_file_key, FileRecord};
use super::object_store::ObjectStore;

/// Hard cap on a single listing call. No continuation is followed, so a
/// namespace with more objects than this is silently truncated.
pub const MAX_LISTING_KEYS: usize = 1000;

#[derive(Clone)]
pub struct StorageFacade {
    store: Arc<dyn ObjectStore>,
    url_expiry_secs: u32,
}

impl StorageFacade {
    pub fn new(store: Arc<dyn ObjectStore>, url_expiry_secs: u32) -> Self {
        Self {
            store,
            url_expiry_secs,
        }
    }

    /// Lists the files under `user_name`'s namespace, optionally filtered by
    /// a case-insensitive substring of the key, paginated with
    /// `[page * size, page * size + size)` over the filtered set.
    ///
    /// Any failure, validation included, is re-signaled as a generic
    /// `FileSearch` error; the cause is only logged.
    pub async fn search_files(
        &self,
        user_name: &str,
        search_term: Option<&str>,
        page: usize,
        size: usize,
    ) -> Result<Vec<FileRecord>> {
        match self.search_files_inner(user_name, search_term, page, size).await {
            Ok(records) => Ok(records),
            Err(e) => {
                error!(
                    "Error searching files for user {} with term {:?}: {}",
                    user_name, search_term, e
                );
                Err(AppError::FileSearch("Failed to search files".to_string()))
            }
        }
    }

    async fn search_files_inner(
        &self,
        user_name: &str,
        search_term: Option<&str>,
        page: usize,
        size: usize,
    ) -> Result<Vec<FileRecord>> {
        if user_name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Username cannot be empty".to_string(),
            ));
        }

        let prefix = format!("{}/", user_name);
        let objects = self.store.list_objects(&prefix, MAX_LISTING_KEYS).await?;

        let term = search_term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let filtered: Vec<_> = objects
            .iter()
            .filter(|o| !o.key.ends_with('/'))
            .filter(|o| match &term {
                Some(t) => o.key.to_lowercase().contains(t),
                None => true,
            })
            .collect();

        let start = page.saturating_mul(size);
        if start >= filtered.len() {
            return Ok(Vec::new());
        }
        let end = start.saturating_add(size).min(filtered.len());

        let mut records = Vec::with_capacity(end - start);
        for object in &filtered[start..end] {
            records.push(self.with_download_url(FileRecord::from(*object)).await);
        }

        Ok(records)
    }

    /// Stores `data` at `"{user_name}/{file_name}"`, overwriting any
    /// existing object. Every failure collapses into a single `FileUpload`
    /// error kind.
    pub async fn upload_file(
        &self,
        user_name: &str,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<FileRecord> {
        match self
            .upload_file_inner(user_name, file_name, content_type, data)
            .await
        {
            Ok(record) => Ok(record),
            Err(e) => {
                error!("Error uploading file for user {}: {}", user_name, e);
                Err(AppError::FileUpload(
                    "Failed to upload file, please try again".to_string(),
                ))
            }
        }
    }

    async fn upload_file_inner(
        &self,
        user_name: &str,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<FileRecord> {
        if user_name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Username cannot be empty".to_string(),
            ));
        }
        if data.is_empty() {
            return Err(AppError::BadRequest("File cannot be empty".to_string()));
        }

        let key = build_file_key(user_name, file_name);
        self.store.put_object(&key, content_type, data).await?;
        info!("File uploaded successfully: {}", key);

        let record = FileRecord {
            file_name: file_name.to_string(),
            file_key: key,
            file_size: data.len() as u64,
            last_modified: chrono::Utc::now(),
            download_url: None,
        };

        Ok(self.with_download_url(record).await)
    }

    /// Deletes `"{user_name}/{file_name}"` after confirming it exists.
    ///
    /// Validation and not-found failures stay `BadRequest`; backend delete
    /// failures become `Internal`. The existence check races with concurrent
    /// deletes and is best-effort only.
    pub async fn delete_file(&self, user_name: &str, file_name: &str) -> Result<()> {
        if user_name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Username cannot be empty".to_string(),
            ));
        }
        if file_name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Filename cannot be empty".to_string(),
            ));
        }

        let key = build_file_key(user_name, file_name);
        if !self.file_exists(&key).await {
            return Err(AppError::BadRequest(format!("File not found: {}", file_name)));
        }

        match self.store.delete_object(&key).await {
            Ok(()) => {
                info!("File deleted successfully: {}", key);
                Ok(())
            }
            Err(e) => {
                error!(
                    "Error deleting file {} for user {}: {}",
                    file_name, user_name, e
                );
                Err(AppError::Internal)
            }
        }
    }

    /// Presigns a time-limited download URL for `file_key`. Failures here
    /// surface as `Internal`; listing and upload instead swallow them.
    pub async fn generate_download_url(&self, file_key: &str) -> Result<String> {
        self.store
            .presign_get(file_key, self.url_expiry_secs)
            .await
            .map_err(|e| {
                error!("Error generating download URL for file {}: {}", file_key, e);
                AppError::Internal
            })
    }

    /// Existence checks never fail: not-found and backend errors both map to
    /// `false`.
    pub async fn file_exists(&self, file_key: &str) -> bool {
        match self.store.head_object(file_key).await {
            Ok(meta) => meta.is_some(),
            Err(e) => {
                error!("Error checking file existence for key {}: {}", file_key, e);
                false
            }
        }
    }

    async fn with_download_url(&self, mut record: FileRecord) -> FileRecord {
        match self.generate_download_url(&record.file_key).await {
            Ok(url) => {
                record.download_url = Some(url);
                record
            }
            Err(e) => {
                warn!(
                    "Could not generate download URL for file {}: {}",
                    record.file_key, e
                );
                record
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::{anyhow, Result as AnyResult};
    use async_trait::async_trait;

    use super::super::memory::InMemoryObjectStore;
    use super::super::object_store::{ObjectMeta, ObjectStore, StoredObject};
    use super::*;

    fn facade_with(store: Arc<dyn ObjectStore>) -> StorageFacade {
        StorageFacade::new(store, 900)
    }

    async fn seeded_facade(keys: &[&str]) -> (StorageFacade, Arc<InMemoryObjectStore>) {
        let store = Arc::new(InMemoryObjectStore::new());
        for key in keys {
            store
                .put_object(key, "application/octet-stream", b"data")
                .await
                .unwrap();
        }
        (facade_with(store.clone()), store)
    }

    /// Backend double whose calls all fail; used to exercise the error
    /// collapse and degradation paths.
    struct FailingStore;

    #[async_trait]
    impl ObjectStore for FailingStore {
        async fn list_objects(&self, _: &str, _: usize) -> AnyResult<Vec<StoredObject>> {
            Err(anyhow!("listing unavailable"))
        }
        async fn put_object(&self, _: &str, _: &str, _: &[u8]) -> AnyResult<()> {
            Err(anyhow!("put unavailable"))
        }
        async fn delete_object(&self, _: &str) -> AnyResult<()> {
            Err(anyhow!("delete unavailable"))
        }
        async fn head_object(&self, _: &str) -> AnyResult<Option<ObjectMeta>> {
            Err(anyhow!("head unavailable"))
        }
        async fn presign_get(&self, _: &str, _: u32) -> AnyResult<String> {
            Err(anyhow!("signer unavailable"))
        }
    }

    /// Delegates to an in-memory store but fails presigning and counts
    /// deletes.
    struct UnsignableStore {
        inner: InMemoryObjectStore,
        deletes: AtomicUsize,
    }

    impl UnsignableStore {
        fn new(inner: InMemoryObjectStore) -> Self {
            Self {
                inner,
                deletes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ObjectStore for UnsignableStore {
        async fn list_objects(&self, prefix: &str, max_keys: usize) -> AnyResult<Vec<StoredObject>> {
            self.inner.list_objects(prefix, max_keys).await
        }
        async fn put_object(&self, key: &str, content_type: &str, data: &[u8]) -> AnyResult<()> {
            self.inner.put_object(key, content_type, data).await
        }
        async fn delete_object(&self, key: &str) -> AnyResult<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete_object(key).await
        }
        async fn head_object(&self, key: &str) -> AnyResult<Option<ObjectMeta>> {
            self.inner.head_object(key).await
        }
        async fn presign_get(&self, _: &str, _: u32) -> AnyResult<String> {
            Err(anyhow!("signer unavailable"))
        }
    }

    #[tokio::test]
    async fn test_search_returns_namespace_files_only() {
        let (facade, _) = seeded_facade(&[
            "alice/notes.txt",
            "alice/report.pdf",
            "alice/archive/",
            "bob/report.pdf",
        ])
        .await;

        let records = facade.search_files("alice", None, 0, 10).await.unwrap();
        let keys: Vec<_> = records.iter().map(|r| r.file_key.as_str()).collect();
        assert_eq!(keys, vec!["alice/notes.txt", "alice/report.pdf"]);
    }

    #[tokio::test]
    async fn test_search_no_matches_is_empty_not_error() {
        let (facade, _) = seeded_facade(&[]).await;
        let records = facade.search_files("nobody", None, 0, 10).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_search_blank_username_collapses_to_search_error() {
        let (facade, _) = seeded_facade(&["alice/notes.txt"]).await;
        let err = facade.search_files("  ", None, 0, 10).await.unwrap_err();
        assert!(matches!(err, AppError::FileSearch(msg) if msg == "Failed to search files"));
    }

    #[tokio::test]
    async fn test_search_backend_failure_collapses_to_search_error() {
        let facade = facade_with(Arc::new(FailingStore));
        let err = facade.search_files("alice", None, 0, 10).await.unwrap_err();
        assert!(matches!(err, AppError::FileSearch(_)));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let (facade, _) = seeded_facade(&["alice/Invoice_Final.pdf", "alice/notes.txt"]).await;

        let records = facade
            .search_files("alice", Some("invoice"), 0, 10)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "Invoice_Final.pdf");
    }

    #[tokio::test]
    async fn test_blank_search_term_matches_everything() {
        let (facade, _) = seeded_facade(&["alice/a.txt", "alice/b.txt"]).await;
        let records = facade.search_files("alice", Some("  "), 0, 10).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_pagination_partitions_without_overlap() {
        let (facade, _) = seeded_facade(&[
            "alice/f1.txt",
            "alice/f2.txt",
            "alice/f3.txt",
            "alice/f4.txt",
            "alice/f5.txt",
        ])
        .await;

        let mut all = Vec::new();
        for page in 0..3 {
            let records = facade.search_files("alice", None, page, 2).await.unwrap();
            all.extend(records.into_iter().map(|r| r.file_key));
        }
        assert_eq!(
            all,
            vec![
                "alice/f1.txt",
                "alice/f2.txt",
                "alice/f3.txt",
                "alice/f4.txt",
                "alice/f5.txt"
            ]
        );

        let beyond = facade.search_files("alice", None, 3, 2).await.unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_search_excludes_directory_markers() {
        let (facade, _) = seeded_facade(&["alice/docs/", "alice/docs/plan.txt"]).await;
        let records = facade.search_files("alice", None, 0, 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_key, "alice/docs/plan.txt");
    }

    #[tokio::test]
    async fn test_search_attaches_download_urls() {
        let (facade, _) = seeded_facade(&["alice/notes.txt"]).await;
        let records = facade.search_files("alice", None, 0, 10).await.unwrap();
        assert!(records[0].download_url.is_some());
    }

    #[tokio::test]
    async fn test_presign_failure_degrades_listing() {
        let inner = InMemoryObjectStore::new();
        inner
            .put_object("alice/notes.txt", "text/plain", b"data")
            .await
            .unwrap();
        let facade = facade_with(Arc::new(UnsignableStore::new(inner)));

        let records = facade.search_files("alice", None, 0, 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].download_url.is_none());
    }

    #[tokio::test]
    async fn test_upload_then_search_round_trip() {
        let (facade, _) = seeded_facade(&[]).await;

        let uploaded = facade
            .upload_file("alice", "report.pdf", "application/pdf", b"pdf bytes")
            .await
            .unwrap();
        assert_eq!(uploaded.file_key, "alice/report.pdf");
        assert_eq!(uploaded.file_size, 9);
        assert!(uploaded.download_url.is_some());

        let records = facade.search_files("alice", None, 0, 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_key, "alice/report.pdf");
    }

    #[tokio::test]
    async fn test_upload_overwrites_existing_key() {
        let (facade, store) = seeded_facade(&[]).await;

        facade
            .upload_file("alice", "report.pdf", "application/pdf", b"v1")
            .await
            .unwrap();
        let replaced = facade
            .upload_file("alice", "report.pdf", "application/pdf", b"version 2")
            .await
            .unwrap();

        assert_eq!(replaced.file_size, 9);
        assert_eq!(store.object_count(), 1);
    }

    #[tokio::test]
    async fn test_upload_empty_content_is_upload_error() {
        let (facade, _) = seeded_facade(&[]).await;
        let err = facade
            .upload_file("alice", "empty.txt", "text/plain", b"")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FileUpload(_)));
    }

    #[tokio::test]
    async fn test_upload_blank_username_is_upload_error() {
        let (facade, _) = seeded_facade(&[]).await;
        let err = facade
            .upload_file("", "notes.txt", "text/plain", b"data")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FileUpload(_)));
    }

    #[tokio::test]
    async fn test_delete_existing_file() {
        let (facade, _) = seeded_facade(&["alice/old.txt"]).await;
        facade.delete_file("alice", "old.txt").await.unwrap();
        assert!(!facade.file_exists("alice/old.txt").await);
    }

    #[tokio::test]
    async fn test_delete_missing_file_never_reaches_backend() {
        let store = Arc::new(UnsignableStore::new(InMemoryObjectStore::new()));
        let facade = facade_with(store.clone());

        let err = facade.delete_file("alice", "missing.pdf").await.unwrap_err();
        assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("missing.pdf")));
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delete_blank_arguments_stay_bad_request() {
        let (facade, _) = seeded_facade(&[]).await;
        assert!(matches!(
            facade.delete_file("", "f.txt").await.unwrap_err(),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            facade.delete_file("alice", "  ").await.unwrap_err(),
            AppError::BadRequest(_)
        ));
    }

    #[tokio::test]
    async fn test_file_exists_never_errors() {
        let (facade, _) = seeded_facade(&["alice/notes.txt"]).await;
        assert!(facade.file_exists("alice/notes.txt").await);
        assert!(!facade.file_exists("alice/absent.txt").await);

        let failing = facade_with(Arc::new(FailingStore));
        assert!(!failing.file_exists("alice/notes.txt").await);
    }

    #[tokio::test]
    async fn test_generate_download_url_direct_failure_is_internal() {
        let facade = facade_with(Arc::new(FailingStore));
        let err = facade.generate_download_url("alice/notes.txt").await.unwrap_err();
        assert!(matches!(err, AppError::Internal));
    }
}
