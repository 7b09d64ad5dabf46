//! Proofhook Server - Main entry point

use anyhow::Result;
use proofhook_common::{
    extract::FieldExtractor,
    logging::{init_logging, LogConfig},
};
use tracing::info;

use proofhook_server::{
    api::{self, AppState},
    config::Config,
    storage::{config::StorageConfig, Storage},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let log_config = LogConfig::builder()
        .log_file_prefix("proofhook-server")
        .filter_directives("proofhook_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting proofhook server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let storage_config = StorageConfig::from_env()?;
    let storage = Storage::connect(&storage_config, &config.database).await?;

    api::prepare_storage(&storage, &config).await?;

    let extractor = FieldExtractor::standard()?;
    let settings = api::ingest_settings(&config, &storage_config);
    info!(
        watched_field = %settings.watched_field,
        container = %settings.container,
        path_prefix = %settings.path_prefix,
        rules = extractor.fields().count(),
        "Webhook ingestion configured"
    );

    api::serve(&config, AppState::new(storage, extractor, settings)).await?;

    Ok(())
}
