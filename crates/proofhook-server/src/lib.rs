//! Proofhook Server Library
//!
//! Webhook receiver for installation-proof form submissions.
//!
//! # Overview
//!
//! The form service posts each submission as `multipart/form-data`. For every
//! part named after the watched field (`pretty` by default) the server:
//!
//! - extracts a proof record (invoice number, customer, address and the two
//!   upload references) from the free text
//! - writes it as JSON to the object store under
//!   `<prefix>/<invoiceNumber>/<freshId>`
//!
//! and finally records the raw text of the last watched part in the metadata
//! store, keyed by a fresh submission group id.
//!
//! # Architecture
//!
//! - **features**: vertical slices with `commands/` and `routes.rs`
//! - **storage**: `ObjectStore` and `MetadataStore` traits with S3,
//!   PostgreSQL and in-memory implementations
//! - **middleware**: CORS, request tracing and panic recovery
//!
//! # Example
//!
//! ```no_run
//! use proofhook_common::extract::FieldExtractor;
//! use proofhook_server::{api, config::Config, storage::{config::StorageConfig, Storage}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let storage_config = StorageConfig::from_env()?;
//!     let storage = Storage::connect(&storage_config, &config.database).await?;
//!
//!     let settings = api::ingest_settings(&config, &storage_config);
//!     let state = api::AppState::new(storage, FieldExtractor::standard()?, settings);
//!     api::serve(&config, state).await?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod middleware;
pub mod storage;

pub use error::{ServerError, ServerResult};
