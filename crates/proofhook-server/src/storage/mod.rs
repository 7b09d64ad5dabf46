//! Storage collaborators
//!
//! The webhook pipeline writes to two stores, each behind a trait so handlers can
//! run against real services or in-memory fakes:
//!
//! - [`ObjectStore`]: serialized proof records (S3 / MinIO, or memory)
//! - [`MetadataStore`]: one submission row per request (PostgreSQL, or memory)
//!
//! Both are constructed once at startup and handed to the router inside
//! [`Storage`].

use async_trait::async_trait;
use proofhook_common::{ProofhookError, SubmissionRecord};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

pub mod config;
pub mod memory;
pub mod postgres;
pub mod s3;

pub use memory::{InMemoryMetadataStore, InMemoryObjectStore};
pub use postgres::PgMetadataStore;
pub use s3::S3ObjectStore;

/// A write rejected by one of the stores
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to ensure container '{container}': {message}")]
    ContainerCreate { container: String, message: String },

    #[error("Failed to upload object '{key}': {message}")]
    PutObject { key: String, message: String },

    #[error("Failed to serialize proof record: {0}")]
    Serialize(#[from] ProofhookError),

    #[error("Failed to upsert row into '{table}': {message}")]
    UpsertRow { table: String, message: String },

    #[error("Table name '{table}' is not a valid SQL identifier")]
    InvalidTable { table: String },

    #[error("Failed to prepare table '{table}': {message}")]
    Schema { table: String, message: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Object written by [`ObjectStore::put_object`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub key: String,
    /// Hex SHA-256 of the uploaded bytes
    pub checksum: String,
    pub size: i64,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Create `container` unless it already exists
    async fn ensure_container(&self, container: &str) -> StorageResult<()>;

    /// Write `data` at `key`, replacing any existing object
    async fn put_object(
        &self,
        container: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<UploadResult>;
}

#[async_trait]
pub trait MetadataStore: Send + Sync {
    fn backend(&self) -> &'static str;

    /// Create `table` unless it already exists
    async fn ensure_table(&self, table: &str) -> StorageResult<()>;

    /// Insert `record`, replacing any row with the same partition and row key
    async fn upsert_row(&self, table: &str, record: &SubmissionRecord) -> StorageResult<()>;
}

/// Storage handles shared by all requests
#[derive(Clone)]
pub struct Storage {
    objects: Arc<dyn ObjectStore>,
    metadata: Arc<dyn MetadataStore>,
}

impl Storage {
    pub fn new(objects: Arc<dyn ObjectStore>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self { objects, metadata }
    }

    /// Fresh in-memory stores, for local runs without S3 or PostgreSQL
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryMetadataStore::new()),
        )
    }

    /// Connect to the stores selected by `config`
    pub async fn connect(
        config: &config::StorageConfig,
        database: &DatabaseConfig,
    ) -> anyhow::Result<Self> {
        let storage = match config.backend {
            config::StorageBackend::Memory => Self::in_memory(),
            config::StorageBackend::Durable => {
                let objects = S3ObjectStore::new(config);
                let metadata = PgMetadataStore::connect(database).await?;
                Self::new(Arc::new(objects), Arc::new(metadata))
            },
        };

        info!(
            objects = storage.objects.backend(),
            metadata = storage.metadata.backend(),
            "Storage initialized"
        );

        Ok(storage)
    }

    pub fn objects(&self) -> &dyn ObjectStore {
        self.objects.as_ref()
    }

    pub fn metadata(&self) -> &dyn MetadataStore {
        self.metadata.as_ref()
    }
}
