//! End-to-end tests against real S3 (MinIO) and PostgreSQL containers
//!
//! Require Docker. Run with `cargo test --test storage_e2e_tests -- --ignored`.

mod common;

use common::{TestMinio, TestPostgres};
use proofhook_common::{checksum::verify_sha256, SubmissionRecord};
use proofhook_server::{
    config::DatabaseConfig,
    storage::{
        config::StorageConfig, MetadataStore, ObjectStore, PgMetadataStore, S3ObjectStore,
        StorageError,
    },
};

const TABLE: &str = "installation_proof_requests";

fn database_config(url: &str) -> DatabaseConfig {
    DatabaseConfig {
        url: url.to_string(),
        max_connections: 2,
        min_connections: 1,
        connect_timeout_secs: 30,
        submission_table: TABLE.to_string(),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_postgres_upsert_replaces_row() {
    let pg = TestPostgres::start().await.unwrap();
    let store = PgMetadataStore::connect(&database_config(&pg.url)).await.unwrap();

    store.ensure_table(TABLE).await.unwrap();
    // Second call must be a no-op
    store.ensure_table(TABLE).await.unwrap();

    let mut record = SubmissionRecord::new("group-1", "first text");
    store.upsert_row(TABLE, &record).await.unwrap();

    record.raw_payload = "second text".to_string();
    store.upsert_row(TABLE, &record).await.unwrap();

    let other = SubmissionRecord::new("group-1", "other entry");
    store.upsert_row(TABLE, &other).await.unwrap();

    let rows = store.find_partition(TABLE, "group-1").await.unwrap();
    assert_eq!(rows.len(), 2);
    let replaced = rows.iter().find(|r| r.entry_id == record.entry_id).unwrap();
    assert_eq!(replaced.raw_payload, "second text");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_postgres_rejects_unsafe_table_name() {
    let pg = TestPostgres::start().await.unwrap();
    let store = PgMetadataStore::connect(&database_config(&pg.url)).await.unwrap();

    let record = SubmissionRecord::new("group-1", "");
    let err = store
        .upsert_row("requests; DROP TABLE x", &record)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidTable { .. }));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_s3_creates_container_and_stores_object() {
    let minio = TestMinio::start().await.unwrap();
    let store = S3ObjectStore::new(&StorageConfig::for_minio(&minio.endpoint, "proofs"));

    store.ensure_container("proofs").await.unwrap();
    store.ensure_container("proofs").await.unwrap();

    let data = br#"{"invoiceNumber":"INV42"}"#.to_vec();
    let upload = store
        .put_object("proofs", "installation-proof/INV42/abc", data.clone(), "application/json")
        .await
        .unwrap();
    assert_eq!(upload.size, data.len() as i64);

    let object = store
        .client()
        .get_object()
        .bucket("proofs")
        .key("installation-proof/INV42/abc")
        .send()
        .await
        .unwrap();
    assert_eq!(object.content_type(), Some("application/json"));

    let body = object.body.collect().await.unwrap().into_bytes();
    assert!(verify_sha256(&body, &upload.checksum));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_s3_put_without_container_fails() {
    let minio = TestMinio::start().await.unwrap();
    let store = S3ObjectStore::new(&StorageConfig::for_minio(&minio.endpoint, "missing"));

    let result = store
        .put_object("missing", "a/b", b"{}".to_vec(), "application/json")
        .await;

    assert!(result.is_err());
}
