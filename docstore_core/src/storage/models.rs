use chrono::{DateTime, Utc};
use serde::Serialize;

use super::object_store::StoredObject;

/// Per-request view of a stored file. Never persisted; the object store is
/// the source of truth.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub file_name: String,
    pub file_key: String,
    pub file_size: u64,
    pub last_modified: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl From<&StoredObject> for FileRecord {
    fn from(object: &StoredObject) -> Self {
        Self {
            file_name: file_name_from_key(&object.key).to_string(),
            file_key: object.key.clone(),
            file_size: object.size,
            last_modified: object.last_modified,
            download_url: None,
        }
    }
}

/// Maps the (user, file) identity to its object key: `"{user}/{file}"`.
pub fn build_file_key(user_name: &str, file_name: &str) -> String {
    format!("{}/{}", user_name, file_name)
}

/// Basename of an object key.
pub fn file_name_from_key(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
