//! HTTP route table and service-level endpoints

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use crate::{handlers::storage, AppState};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/search", get(storage::search_files))
        .route("/files", get(storage::list_user_files))
        .route("/upload", post(storage::upload_file))
        .route("/delete", delete(storage::delete_file))
}

async fn handle_root(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "app": state.app_name,
        "version": state.version,
        "endpoints": {
            "health": "/health",
            "search": "/search?userName=&searchTerm=&page=&size=",
            "files": "/files?userName=&page=&size=",
            "upload": "POST /upload?userName=",
            "delete": "DELETE /delete?userName=&fileName="
        }
    }))
}

async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}
