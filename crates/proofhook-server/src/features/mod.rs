//! Feature slices of the proofhook API
//!
//! Each feature is a vertical slice with `commands/` for writes and a
//! `routes.rs` exposing them over HTTP.
//!
//! - **submissions**: form-submission webhook storing proof records and the
//!   raw submission text

pub mod submissions;

use axum::Router;
use proofhook_common::extract::FieldExtractor;
use std::sync::Arc;

use crate::storage::Storage;
use submissions::{IngestSettings, SubmissionState};

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub storage: Storage,
    pub extractor: Arc<FieldExtractor>,
    pub settings: Arc<IngestSettings>,
}

impl FeatureState {
    fn submissions(&self) -> SubmissionState {
        SubmissionState {
            storage: self.storage.clone(),
            extractor: self.extractor.clone(),
            settings: self.settings.clone(),
        }
    }
}

/// Versioned routes, mounted under `/api/v1`
///
/// - `/webhooks/form-submissions` - form-submission webhook
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest(
        "/webhooks",
        submissions::submissions_routes().with_state(state.submissions()),
    )
}

/// Unversioned routes kept for callers configured before `/api/v1` existed
pub fn legacy_router(state: FeatureState) -> Router<()> {
    submissions::legacy_routes().with_state(state.submissions())
}
