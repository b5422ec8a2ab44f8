//! Core library for the document storage service: configuration, error
//! handling, the storage facade over an object-store backend, and the HTTP
//! surface.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod storage;

pub use config::AppConfig;
pub use error::{ApiError, AppError, Result};
pub use handlers::create_routes;
pub use storage::{
    FileRecord, InMemoryObjectStore, ObjectStore, S3ObjectStore, StorageFacade, MAX_LISTING_KEYS,
};

use axum::{extract::DefaultBodyLimit, Router};
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub storage: StorageFacade,
}

impl AppState {
    pub fn new(storage: StorageFacade) -> Self {
        Self {
            app_name: "Document Storage Service".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            storage,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    create_app_with_config(state, AppConfig::default())
}

pub fn create_app_with_config(state: AppState, config: AppConfig) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes()))
        .layer(middleware::cors::cors_layer_permissive())
        .layer(middleware::logging::logging_layer())
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
