use crate::config::Config;
use crate::error::{ServerError, ServerResult};
use crate::features::{self, submissions::IngestSettings};
use crate::middleware;
use crate::storage::{config::StorageConfig, Storage};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use proofhook_common::extract::FieldExtractor;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub extractor: Arc<FieldExtractor>,
    pub settings: Arc<IngestSettings>,
}

impl AppState {
    pub fn new(storage: Storage, extractor: FieldExtractor, settings: IngestSettings) -> Self {
        Self {
            storage,
            extractor: Arc::new(extractor),
            settings: Arc::new(settings),
        }
    }
}

/// Ingest settings drawn from server and storage configuration
pub fn ingest_settings(config: &Config, storage: &StorageConfig) -> IngestSettings {
    IngestSettings {
        watched_field: config.ingest.watched_field.clone(),
        container: storage.container.clone(),
        path_prefix: storage.path_prefix.clone(),
        table: config.database.submission_table.clone(),
    }
}

/// Create the metadata table if it does not exist yet
pub async fn prepare_storage(storage: &Storage, config: &Config) -> ServerResult<()> {
    storage
        .metadata()
        .ensure_table(&config.database.submission_table)
        .await?;

    info!(table = %config.database.submission_table, "Metadata table ready");
    Ok(())
}

pub async fn serve(config: &Config, state: AppState) -> ServerResult<()> {
    let app = create_router(state, config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| ServerError::Config(format!("invalid listen address: {}", e)))?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Build the application router with all routes and middleware
pub fn create_router(state: AppState, config: &Config) -> Router {
    let feature_state = features::FeatureState {
        storage: state.storage.clone(),
        extractor: state.extractor.clone(),
        settings: state.settings.clone(),
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
        .nest("/api/v1", features::router(feature_state.clone()))
        .merge(features::legacy_router(feature_state))
        .layer(DefaultBodyLimit::max(config.ingest.body_limit_bytes))
        .layer(middleware::catch_panic_layer())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "proofhook",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "storage_backend": state.storage.objects().backend(),
            "metadata_backend": state.storage.metadata().backend(),
        })),
    )
}

/// Resolves on Ctrl+C or SIGTERM, then allows in-flight requests to drain
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting graceful shutdown"),
        _ = terminate => info!("Received terminate signal, starting graceful shutdown"),
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryMetadataStore, InMemoryObjectStore};

    #[test]
    fn test_ingest_settings_from_config() {
        let mut config = Config::default();
        config.ingest.watched_field = "notes".to_string();
        config.database.submission_table = "requests".to_string();

        let mut storage = StorageConfig::in_memory();
        storage.path_prefix = "proofs".to_string();

        let settings = ingest_settings(&config, &storage);
        assert_eq!(settings.watched_field, "notes");
        assert_eq!(settings.container, storage.container);
        assert_eq!(settings.path_prefix, "proofs");
        assert_eq!(settings.table, "requests");
    }

    #[tokio::test]
    async fn test_prepare_storage_creates_table() {
        let metadata = Arc::new(InMemoryMetadataStore::new());
        let storage = Storage::new(Arc::new(InMemoryObjectStore::new()), metadata.clone());
        let config = Config::default();

        prepare_storage(&storage, &config).await.unwrap();

        assert!(metadata.has_table(&config.database.submission_table));
    }
}
