//! Main entry point for the document storage server binary

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use docstore_core::{
    create_app_with_config, run_server, AppConfig, AppState, InMemoryObjectStore, ObjectStore,
    S3ObjectStore, StorageFacade,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let store: Arc<dyn ObjectStore> = if config.s3.enabled {
        match S3ObjectStore::new(&config.s3) {
            Ok(store) => {
                info!(
                    "S3 backend initialized: bucket={} region={}",
                    config.s3.bucket, config.s3.region
                );
                Arc::new(store)
            }
            Err(e) => {
                warn!(
                    "Failed to initialize S3 backend, falling back to in-memory store: {}",
                    e
                );
                Arc::new(InMemoryObjectStore::new())
            }
        }
    } else {
        info!("S3 backend disabled, using in-memory store");
        Arc::new(InMemoryObjectStore::new())
    };

    let storage = StorageFacade::new(store, config.download.url_expiry_seconds);
    let state = AppState::new(storage);

    info!("App: {} v{}", state.app_name, state.version);

    let app = create_app_with_config(state, config);
    run_server(app, addr).await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };

        format!(
            "{}={},tower_http=debug,axum=debug",
            env!("CARGO_CRATE_NAME").replace('-', "_"),
            default_level
        )
        .into()
    });

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}
