use proofhook_common::{naming, ProofRecord};
use serde::Serialize;

use crate::storage::{ObjectStore, StorageError};

pub const PROOF_CONTENT_TYPE: &str = "application/json";

/// Store one extracted proof record under `directory`
#[derive(Debug, Clone, Serialize)]
pub struct WriteProofCommand {
    pub container: String,
    /// `<prefix>/<invoiceNumber>`; a fresh id is appended per write
    pub directory: String,
    pub record: ProofRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteProofResponse {
    pub key: String,
    pub checksum: String,
    pub size: i64,
}

#[tracing::instrument(skip(objects, command), fields(container = %command.container, directory = %command.directory))]
pub async fn handle(
    objects: &dyn ObjectStore,
    command: WriteProofCommand,
) -> Result<WriteProofResponse, StorageError> {
    objects.ensure_container(&command.container).await?;

    let body = command.record.to_json_bytes()?;
    let key = naming::object_path(&command.directory, &naming::fresh_id());

    let upload = objects
        .put_object(&command.container, &key, body, PROOF_CONTENT_TYPE)
        .await?;

    Ok(WriteProofResponse {
        key: upload.key,
        checksum: upload.checksum,
        size: upload.size,
    })
}
