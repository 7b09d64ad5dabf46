//! In-memory stores
//!
//! Used by the `memory` storage backend for local runs and by tests. Both
//! stores can be told to reject writes, which is how the partial-failure
//! behaviour of the webhook is exercised.

use async_trait::async_trait;
use proofhook_common::{checksum::sha256_hex, SubmissionRecord};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{MetadataStore, ObjectStore, StorageError, StorageResult, UploadResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Object as held by [`InMemoryObjectStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub container: String,
    pub key: String,
    pub data: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
pub struct InMemoryObjectStore {
    containers: Mutex<HashSet<String>>,
    objects: Mutex<BTreeMap<(String, String), StoredObject>>,
    /// Every put in call order, including rejected ones
    attempts: Mutex<Vec<String>>,
    /// 1-based put attempts to reject
    failing_attempts: Mutex<HashSet<usize>>,
    fail_containers: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the `n`th call to `put_object` (1-based)
    pub fn fail_put_attempt(&self, n: usize) {
        lock(&self.failing_attempts).insert(n);
    }

    /// Reject every `ensure_container` call
    pub fn fail_container_creation(&self) {
        self.fail_containers.store(true, Ordering::SeqCst);
    }

    pub fn has_container(&self, container: &str) -> bool {
        lock(&self.containers).contains(container)
    }

    /// Stored objects ordered by container and key
    pub fn objects(&self) -> Vec<StoredObject> {
        lock(&self.objects).values().cloned().collect()
    }

    pub fn get(&self, container: &str, key: &str) -> Option<StoredObject> {
        lock(&self.objects)
            .get(&(container.to_string(), key.to_string()))
            .cloned()
    }

    /// Keys passed to `put_object`, in call order
    pub fn put_attempts(&self) -> Vec<String> {
        lock(&self.attempts).clone()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ensure_container(&self, container: &str) -> StorageResult<()> {
        if self.fail_containers.load(Ordering::SeqCst) {
            return Err(StorageError::ContainerCreate {
                container: container.to_string(),
                message: "container creation disabled".to_string(),
            });
        }

        lock(&self.containers).insert(container.to_string());
        Ok(())
    }

    async fn put_object(
        &self,
        container: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<UploadResult> {
        let attempt = {
            let mut attempts = lock(&self.attempts);
            attempts.push(key.to_string());
            attempts.len()
        };

        if lock(&self.failing_attempts).contains(&attempt) {
            return Err(StorageError::PutObject {
                key: key.to_string(),
                message: format!("injected failure on attempt {}", attempt),
            });
        }

        if !self.has_container(container) {
            return Err(StorageError::PutObject {
                key: key.to_string(),
                message: format!("container '{}' does not exist", container),
            });
        }

        let result = UploadResult {
            key: key.to_string(),
            checksum: sha256_hex(&data),
            size: data.len() as i64,
        };

        lock(&self.objects).insert(
            (container.to_string(), key.to_string()),
            StoredObject {
                container: container.to_string(),
                key: key.to_string(),
                data,
                content_type: content_type.to_string(),
            },
        );

        Ok(result)
    }
}

#[derive(Default)]
pub struct InMemoryMetadataStore {
    tables: Mutex<HashSet<String>>,
    rows: Mutex<BTreeMap<(String, String, String), SubmissionRecord>>,
    upserts: AtomicUsize,
    fail_upserts: AtomicBool,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent `upsert_row` call
    pub fn fail_upserts(&self) {
        self.fail_upserts.store(true, Ordering::SeqCst);
    }

    /// Number of `upsert_row` calls, including rejected ones
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn has_table(&self, table: &str) -> bool {
        lock(&self.tables).contains(table)
    }

    /// Rows of `table` ordered by partition and row key
    pub fn rows(&self, table: &str) -> Vec<SubmissionRecord> {
        lock(&self.rows)
            .iter()
            .filter(|((t, _, _), _)| t == table)
            .map(|(_, record)| record.clone())
            .collect()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ensure_table(&self, table: &str) -> StorageResult<()> {
        lock(&self.tables).insert(table.to_string());
        Ok(())
    }

    async fn upsert_row(&self, table: &str, record: &SubmissionRecord) -> StorageResult<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);

        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(StorageError::UpsertRow {
                table: table.to_string(),
                message: "upserts disabled".to_string(),
            });
        }

        lock(&self.tables).insert(table.to_string());
        lock(&self.rows).insert(
            (
                table.to_string(),
                record.submission_group_id.clone(),
                record.entry_id.clone(),
            ),
            record.clone(),
        );

        Ok(())
    }
}
