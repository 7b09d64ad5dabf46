//! Webhook ingestion
//!
//! Drives one decoded submission through extraction and both stores:
//!
//! 1. every part named after the watched field is extracted into a
//!    [`ProofRecord`](proofhook_common::ProofRecord) and written to the object
//!    store under `<prefix>/<invoiceNumber>/<freshId>`
//! 2. the text of the last watched part (or `""`) is recorded once in the
//!    metadata store under a fresh submission group id
//!
//! Proof writes are best effort: a failed write is reported in
//! [`IngestReport::proofs`] and the remaining parts are still processed.
//! Nothing already written is rolled back. Only the final metadata write can
//! fail the request.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use proofhook_common::{extract::FieldExtractor, naming};
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    record_submission::{self, RecordSubmissionCommand},
    write_proof::{self, WriteProofCommand, WriteProofResponse},
};
use crate::features::submissions::multipart::FormPart;
use crate::storage::{Storage, StorageError};

/// Where and what to ingest
#[derive(Debug, Clone, Serialize)]
pub struct IngestSettings {
    pub watched_field: String,
    pub container: String,
    pub path_prefix: String,
    pub table: String,
}

#[derive(Debug, Clone)]
pub struct IngestSubmissionCommand {
    /// Parts in payload order
    pub parts: Vec<FormPart>,
}

/// Result of writing one watched part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProofOutcome {
    Stored(WriteProofResponse),
    Failed { directory: String, error: String },
}

impl ProofOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, ProofOutcome::Stored(_))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub submission_group_id: String,
    pub entry_id: String,
    /// One entry per watched part, in payload order
    pub proofs: Vec<ProofOutcome>,
}

impl IngestReport {
    pub fn stored_count(&self) -> usize {
        self.proofs.iter().filter(|p| p.is_stored()).count()
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    /// Payload is not readable multipart form data; nothing was written
    #[error("{0}")]
    MalformedRequest(String),

    /// The metadata store rejected the submission row
    #[error("Storage write failed: {0}")]
    StorageWrite(#[from] StorageError),

    #[error("Error processing request: {0}")]
    Processing(String),
}

impl From<MultipartError> for IngestError {
    fn from(err: MultipartError) -> Self {
        if err.status().is_server_error() {
            IngestError::Processing(err.body_text())
        } else {
            IngestError::MalformedRequest(format!("Invalid multipart body: {}", err.body_text()))
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        match self {
            IngestError::MalformedRequest(ref detail) => {
                warn!(detail = %detail, "Rejected malformed webhook payload");
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            },
            IngestError::StorageWrite(ref e) => {
                error!(error = %e, "Error processing webhook request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error processing request: the submission could not be stored",
                )
                    .into_response()
            },
            IngestError::Processing(ref detail) => {
                error!(detail = %detail, "Error processing webhook request");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error processing request").into_response()
            },
        }
    }
}

#[tracing::instrument(skip_all, fields(parts = command.parts.len(), watched_field = %settings.watched_field))]
pub async fn handle(
    storage: &Storage,
    extractor: &FieldExtractor,
    settings: &IngestSettings,
    command: IngestSubmissionCommand,
) -> Result<IngestReport, IngestError> {
    let mut proofs = Vec::new();
    let mut raw_payload = Cow::Borrowed("");

    for part in command
        .parts
        .iter()
        .filter(|part| part.name == settings.watched_field)
    {
        let text = part.text();
        if matches!(text, Cow::Owned(_)) {
            warn!(field = %part.name, "Watched field is not valid UTF-8; invalid bytes replaced");
        }

        let record = extractor.extract(&text);
        let directory = naming::proof_directory(&settings.path_prefix, &record.invoice_number);

        let outcome = match write_proof::handle(
            storage.objects(),
            WriteProofCommand {
                container: settings.container.clone(),
                directory: directory.clone(),
                record,
            },
        )
        .await
        {
            Ok(stored) => {
                info!(key = %stored.key, size = stored.size, checksum = %stored.checksum, "Proof record stored");
                ProofOutcome::Stored(stored)
            },
            Err(e) => {
                error!(directory = %directory, error = %e, "Failed to store proof record");
                ProofOutcome::Failed {
                    directory,
                    error: e.to_string(),
                }
            },
        };

        proofs.push(outcome);
        raw_payload = text;
    }

    let submission_group_id = Uuid::new_v4().to_string();
    let record = record_submission::handle(
        storage.metadata(),
        RecordSubmissionCommand {
            table: settings.table.clone(),
            submission_group_id: submission_group_id.clone(),
            raw_payload: raw_payload.into_owned(),
        },
    )
    .await?;

    let report = IngestReport {
        submission_group_id,
        entry_id: record.entry_id,
        proofs,
    };

    info!(
        submission_group_id = %report.submission_group_id,
        proofs_stored = report.stored_count(),
        proofs_failed = report.proofs.len() - report.stored_count(),
        "Submission ingested"
    );

    Ok(report)
}
