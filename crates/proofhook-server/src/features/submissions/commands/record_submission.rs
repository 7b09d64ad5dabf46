use proofhook_common::SubmissionRecord;
use serde::Serialize;

use crate::storage::{MetadataStore, StorageError};

/// Persist the raw watched-field text of one submission
#[derive(Debug, Clone, Serialize)]
pub struct RecordSubmissionCommand {
    pub table: String,
    pub submission_group_id: String,
    pub raw_payload: String,
}

/// Upsert a new row; the entry id is generated here
#[tracing::instrument(skip(metadata, command), fields(table = %command.table, submission_group_id = %command.submission_group_id))]
pub async fn handle(
    metadata: &dyn MetadataStore,
    command: RecordSubmissionCommand,
) -> Result<SubmissionRecord, StorageError> {
    let record = SubmissionRecord::new(command.submission_group_id, command.raw_payload);

    metadata.upsert_row(&command.table, &record).await?;

    tracing::debug!(entry_id = %record.entry_id, "Submission recorded");

    Ok(record)
}
