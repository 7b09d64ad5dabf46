//! Proofhook Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, pure text processing, and logging for the proofhook workspace.
//!
//! # Overview
//!
//! - **Types**: [`ProofRecord`](types::ProofRecord) and
//!   [`SubmissionRecord`](types::SubmissionRecord)
//! - **Extraction**: rule-driven field extraction from free-form submission text
//! - **Naming**: object paths for persisted proof records
//! - **Checksums**: SHA-256 digests of uploaded payloads
//! - **Logging**: `tracing` subscriber setup shared by every binary
//!
//! # Example
//!
//! ```no_run
//! use proofhook_common::extract::FieldExtractor;
//!
//! fn main() -> proofhook_common::Result<()> {
//!     let extractor = FieldExtractor::standard()?;
//!     let record = extractor.extract("Factuurnummer:INV42, Klant: Jane Doe, Offerte uploaden: no");
//!     assert_eq!(record.invoice_number, "INV42");
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod extract;
pub mod logging;
pub mod naming;
pub mod types;

// Re-export commonly used types
pub use error::{ProofhookError, Result};
pub use types::{ProofField, ProofRecord, SubmissionRecord};
