pub mod ingest;
pub mod record_submission;
pub mod write_proof;

pub use ingest::{IngestError, IngestReport, IngestSettings, IngestSubmissionCommand, ProofOutcome};
pub use record_submission::RecordSubmissionCommand;
pub use write_proof::{WriteProofCommand, WriteProofResponse};
