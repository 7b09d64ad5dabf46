//! Shared helpers for proofhook-server integration tests
//!
//! - [`TestApp`] builds the full router on in-memory stores, keeping handles
//!   to both stores for failure injection and assertions
//! - [`MultipartBody`] hand-assembles `multipart/form-data` request bodies
//! - [`TestPostgres`] and [`TestMinio`] start Docker containers for the
//!   ignored end-to-end tests

#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use proofhook_common::extract::FieldExtractor;
use proofhook_server::{
    api::{self, AppState},
    config::Config,
    storage::{
        config::StorageConfig, InMemoryMetadataStore, InMemoryObjectStore, Storage,
    },
};
use std::sync::Arc;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use testcontainers_modules::postgres::Postgres;
use tower::ServiceExt;
use tracing::debug;

pub const BOUNDARY: &str = "proofhook-test-boundary";

pub const WEBHOOK_PATH: &str = "/api/v1/webhooks/form-submissions";
pub const LEGACY_WEBHOOK_PATH: &str = "/api/JotFormWebhookFunction";

/// Builder for a `multipart/form-data` body with a fixed boundary
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(self, name: &str, value: &str) -> Self {
        self.bytes(name, value.as_bytes())
    }

    pub fn bytes(mut self, name: &str, value: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(value);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, value: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(value);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.bytes
    }

    /// Body with the closing boundary missing
    pub fn truncated(self) -> Vec<u8> {
        self.bytes
    }
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// Router on in-memory stores plus handles to those stores
pub struct TestApp {
    pub router: Router,
    pub objects: Arc<InMemoryObjectStore>,
    pub metadata: Arc<InMemoryMetadataStore>,
    pub config: Config,
    pub storage_config: StorageConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let objects = Arc::new(InMemoryObjectStore::new());
        let metadata = Arc::new(InMemoryMetadataStore::new());
        let storage_config = StorageConfig::in_memory();

        let state = AppState::new(
            Storage::new(objects.clone(), metadata.clone()),
            FieldExtractor::standard().unwrap(),
            api::ingest_settings(&config, &storage_config),
        );

        Self {
            router: api::create_router(state, &config),
            objects,
            metadata,
            config,
            storage_config,
        }
    }

    pub fn table(&self) -> &str {
        &self.config.database.submission_table
    }

    pub fn container(&self) -> &str {
        &self.storage_config.container
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn post_multipart(&self, path: &str, body: Vec<u8>) -> Response {
        self.send(multipart_request(Method::POST, path, body)).await
    }
}

pub fn multipart_request(method: Method, path: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// PostgreSQL container with a connection URL
pub struct TestPostgres {
    container: ContainerAsync<Postgres>,
    pub url: String,
}

impl TestPostgres {
    pub async fn start() -> Result<Self> {
        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .context("Failed to get container port")?;

        let url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);
        debug!("PostgreSQL connection: {}", url);

        Ok(Self { container, url })
    }
}

/// MinIO container with an S3 endpoint URL
pub struct TestMinio {
    container: ContainerAsync<GenericImage>,
    pub endpoint: String,
}

impl TestMinio {
    pub async fn start() -> Result<Self> {
        let container = GenericImage::new("minio/minio", "latest")
            .with_exposed_port(9000.tcp())
            .with_wait_for(WaitFor::message_on_stdout("MinIO Object Storage Server"))
            .with_env_var("MINIO_ROOT_USER", "minioadmin")
            .with_env_var("MINIO_ROOT_PASSWORD", "minioadmin")
            .with_cmd(vec!["server", "/data"])
            .start()
            .await
            .context("Failed to start MinIO container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get MinIO host")?;
        let port = container
            .get_host_port_ipv4(9000.tcp())
            .await
            .context("Failed to get MinIO port")?;

        let endpoint = format!("http://{}:{}", host, port);
        debug!("MinIO endpoint: {}", endpoint);

        Ok(Self { container, endpoint })
    }
}
