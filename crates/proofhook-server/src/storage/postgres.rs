//! PostgreSQL metadata store
//!
//! Rows are keyed like a wide-column table: `partition_key` holds the
//! submission group id and `row_key` the entry id. The table name comes from
//! configuration, so it is checked with [`is_sql_identifier`] before being
//! interpolated into any statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use proofhook_common::SubmissionRecord;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::{MetadataStore, StorageError, StorageResult};
use crate::config::DatabaseConfig;

/// PostgreSQL's identifier length limit
const MAX_IDENTIFIER_LEN: usize = 63;

/// True for unquoted identifiers: a letter or `_`, then letters, digits or `_`
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    name.len() <= MAX_IDENTIFIER_LEN
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn checked_table(table: &str) -> StorageResult<&str> {
    if is_sql_identifier(table) {
        Ok(table)
    } else {
        Err(StorageError::InvalidTable {
            table: table.to_string(),
        })
    }
}

fn upsert_statement(table: &str) -> String {
    format!(
        "INSERT INTO {table} (partition_key, row_key, raw_request, recorded_at) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (partition_key, row_key) \
         DO UPDATE SET raw_request = EXCLUDED.raw_request, recorded_at = EXCLUDED.recorded_at"
    )
}

fn create_table_statement(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\
         partition_key TEXT NOT NULL, \
         row_key TEXT NOT NULL, \
         raw_request TEXT NOT NULL, \
         recorded_at TIMESTAMPTZ NOT NULL DEFAULT now(), \
         PRIMARY KEY (partition_key, row_key))"
    )
}

#[derive(Clone)]
pub struct PgMetadataStore {
    pool: PgPool,
}

impl PgMetadataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await?;

        info!("Database connection pool established");

        Ok(Self::new(pool))
    }

    /// All rows of one submission group, oldest first
    pub async fn find_partition(
        &self,
        table: &str,
        partition_key: &str,
    ) -> Result<Vec<SubmissionRecord>, sqlx::Error> {
        let table = checked_table(table).map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        let sql = format!(
            "SELECT partition_key, row_key, raw_request, recorded_at FROM {table} \
             WHERE partition_key = $1 ORDER BY recorded_at"
        );

        let rows: Vec<(String, String, String, DateTime<Utc>)> = sqlx::query_as(&sql)
            .bind(partition_key)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(submission_group_id, entry_id, raw_payload, recorded_at)| SubmissionRecord {
                submission_group_id,
                entry_id,
                raw_payload,
                recorded_at,
            })
            .collect())
    }
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    #[instrument(skip(self))]
    async fn ensure_table(&self, table: &str) -> StorageResult<()> {
        let table = checked_table(table)?;

        sqlx::query(&create_table_statement(table))
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Schema {
                table: table.to_string(),
                message: e.to_string(),
            })?;

        debug!(table, "Metadata table ready");
        Ok(())
    }

    #[instrument(skip(self, record), fields(partition_key = %record.submission_group_id, row_key = %record.entry_id))]
    async fn upsert_row(&self, table: &str, record: &SubmissionRecord) -> StorageResult<()> {
        let table = checked_table(table)?;

        sqlx::query(&upsert_statement(table))
            .bind(&record.submission_group_id)
            .bind(&record.entry_id)
            .bind(&record.raw_payload)
            .bind(record.recorded_at)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::UpsertRow {
                table: table.to_string(),
                message: e.to_string(),
            })?;

        debug!("Submission row upserted");
        Ok(())
    }
}
