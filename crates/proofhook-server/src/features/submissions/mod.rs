//! Form submission webhook
//!
//! Receives `multipart/form-data` posts from the form service, stores one
//! proof record per watched field and records the raw submission text.

pub mod commands;
pub mod multipart;
pub mod routes;

use proofhook_common::extract::FieldExtractor;
use std::sync::Arc;

use crate::storage::Storage;

pub use commands::{IngestError, IngestReport, IngestSettings, ProofOutcome};
pub use multipart::FormPart;
pub use routes::{legacy_routes, submissions_routes, SUCCESS_MESSAGE};

#[derive(Clone)]
pub struct SubmissionState {
    pub storage: Storage,
    pub extractor: Arc<FieldExtractor>,
    pub settings: Arc<IngestSettings>,
}
