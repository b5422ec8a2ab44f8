use axum::{
    extract::{Multipart, Query, State},
    http::Uri,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{response_timestamp, ApiError, AppError},
    storage::FileRecord,
    AppState,
};

fn default_page_size() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "searchTerm")]
    pub search_term: Option<String>,
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub size: usize,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub size: usize,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(rename = "userName")]
    pub user_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub message: String,
    pub files: Vec<FileRecord>,
    pub timestamp: String,
}

impl SearchResponse {
    pub fn new(files: Vec<FileRecord>, user_name: &str, search_term: Option<&str>) -> Self {
        let message = if files.is_empty() {
            match search_term {
                Some(term) if !term.trim().is_empty() => {
                    format!("No files found for file name: {}", term)
                }
                _ => format!("No files found for user {}", user_name),
            }
        } else {
            format!("{} files found for user {}", files.len(), user_name)
        };

        Self {
            success: !files.is_empty(),
            message,
            files,
            timestamp: response_timestamp(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiSuccessResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

impl ApiSuccessResponse {
    pub fn new(message: String) -> Self {
        Self {
            success: true,
            message,
            timestamp: response_timestamp(),
        }
    }
}

/// Transport-level validation: blank required fields are rejected with a
/// field-specific message before the facade runs.
fn require_non_blank(value: &str, message: &str, path: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(message.to_string()).at(path));
    }
    Ok(())
}

pub async fn search_files(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    require_non_blank(&query.user_name, "Username is required", uri.path())?;

    let files = state
        .storage
        .search_files(
            &query.user_name,
            query.search_term.as_deref(),
            query.page,
            query.size,
        )
        .await
        .map_err(|e| e.at(uri.path()))?;

    Ok(Json(SearchResponse::new(
        files,
        &query.user_name,
        query.search_term.as_deref(),
    )))
}

pub async fn list_user_files(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<ListQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    require_non_blank(&query.user_name, "Username is required", uri.path())?;

    let files = state
        .storage
        .search_files(&query.user_name, None, query.page, query.size)
        .await
        .map_err(|e| e.at(uri.path()))?;

    Ok(Json(SearchResponse::new(files, &query.user_name, None)))
}

pub async fn upload_file(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<FileRecord>, ApiError> {
    require_non_blank(&query.user_name, "Username is required", uri.path())?;

    let mut upload: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e)).at(uri.path())
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .ok_or_else(|| AppError::BadRequest("Missing filename".to_string()).at(uri.path()))?
            .to_string();

        let content_type = match field.content_type() {
            Some(ct) => ct.to_string(),
            None => mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        };

        let data = field.bytes().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read file data: {}", e)).at(uri.path())
        })?;

        upload = Some((file_name, content_type, data.to_vec()));
        break;
    }

    let (file_name, content_type, data) = upload
        .ok_or_else(|| AppError::BadRequest("No file found in request".to_string()).at(uri.path()))?;

    let record = state
        .storage
        .upload_file(&query.user_name, &file_name, &content_type, &data)
        .await
        .map_err(|e| e.at(uri.path()))?;

    Ok(Json(record))
}

pub async fn delete_file(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<ApiSuccessResponse>, ApiError> {
    require_non_blank(&query.user_name, "Username is required", uri.path())?;
    require_non_blank(&query.file_name, "Filename is required", uri.path())?;

    state
        .storage
        .delete_file(&query.user_name, &query.file_name)
        .await
        .map_err(|e| e.at(uri.path()))?;

    Ok(Json(ApiSuccessResponse::new(format!(
        "File deleted successfully: {}",
        query.file_name
    ))))
}
