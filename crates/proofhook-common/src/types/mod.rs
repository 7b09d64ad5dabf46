//! Common types used across proofhook

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Structured record extracted from the watched form field
///
/// Every field is always present. A field whose label was not found in the
/// submission text holds an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRecord {
    pub invoice_number: String,
    pub customer_name: String,
    pub address: String,
    pub invoice_upload_flag: String,
    pub quote_upload_flag: String,
}

impl ProofRecord {
    /// Set the value of a single field
    pub fn set(&mut self, field: ProofField, value: impl Into<String>) {
        let slot = match field {
            ProofField::InvoiceNumber => &mut self.invoice_number,
            ProofField::CustomerName => &mut self.customer_name,
            ProofField::Address => &mut self.address,
            ProofField::InvoiceUploadFlag => &mut self.invoice_upload_flag,
            ProofField::QuoteUploadFlag => &mut self.quote_upload_flag,
        };
        *slot = value.into();
    }

    /// Read the value of a single field
    pub fn get(&self, field: ProofField) -> &str {
        match field {
            ProofField::InvoiceNumber => &self.invoice_number,
            ProofField::CustomerName => &self.customer_name,
            ProofField::Address => &self.address,
            ProofField::InvoiceUploadFlag => &self.invoice_upload_flag,
            ProofField::QuoteUploadFlag => &self.quote_upload_flag,
        }
    }

    /// True when no rule matched anything
    pub fn is_empty(&self) -> bool {
        ProofField::ALL.iter().all(|field| self.get(*field).is_empty())
    }

    /// JSON bytes as stored in the object store
    pub fn to_json_bytes(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Names of the fields of a [`ProofRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProofField {
    InvoiceNumber,
    CustomerName,
    Address,
    InvoiceUploadFlag,
    QuoteUploadFlag,
}

impl ProofField {
    pub const ALL: [ProofField; 5] = [
        ProofField::InvoiceNumber,
        ProofField::CustomerName,
        ProofField::Address,
        ProofField::InvoiceUploadFlag,
        ProofField::QuoteUploadFlag,
    ];

    /// Serialized (camelCase) name of the field
    pub fn as_str(self) -> &'static str {
        match self {
            ProofField::InvoiceNumber => "invoiceNumber",
            ProofField::CustomerName => "customerName",
            ProofField::Address => "address",
            ProofField::InvoiceUploadFlag => "invoiceUploadFlag",
            ProofField::QuoteUploadFlag => "quoteUploadFlag",
        }
    }
}

impl std::fmt::Display for ProofField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata row linking a submission to the raw text of its watched field
///
/// `submission_group_id` is the partition key and `entry_id` the row key.
/// Writing an existing key pair replaces the previous row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub submission_group_id: String,
    pub entry_id: String,
    pub raw_payload: String,
    pub recorded_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Build a record for `submission_group_id` with a freshly generated entry id
    pub fn new(submission_group_id: impl Into<String>, raw_payload: impl Into<String>) -> Self {
        Self {
            submission_group_id: submission_group_id.into(),
            entry_id: Uuid::new_v4().to_string(),
            raw_payload: raw_payload.into(),
            recorded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_proof_record_is_empty() {
        let record = ProofRecord::default();
        assert!(record.is_empty());
        for field in ProofField::ALL {
            assert_eq!(record.get(field), "");
        }
    }

    #[test]
    fn test_set_and_get_fields() {
        let mut record = ProofRecord::default();
        record.set(ProofField::Address, "Main St 1");
        record.set(ProofField::QuoteUploadFlag, "no");

        assert_eq!(record.address, "Main St 1");
        assert_eq!(record.get(ProofField::QuoteUploadFlag), "no");
        assert!(!record.is_empty());
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let record = ProofRecord {
            invoice_number: "INV42".to_string(),
            ..Default::default()
        };

        let value: serde_json::Value =
            serde_json::from_slice(&record.to_json_bytes().unwrap()).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 5);
        for field in ProofField::ALL {
            assert!(object.contains_key(field.as_str()), "missing {}", field);
        }
        assert_eq!(object["invoiceNumber"], "INV42");
        assert_eq!(object["customerName"], "");
    }

    #[test]
    fn test_submission_entry_ids_are_unique() {
        let first = SubmissionRecord::new("group", "payload");
        let second = SubmissionRecord::new("group", "payload");

        assert_eq!(first.submission_group_id, second.submission_group_id);
        assert_ne!(first.entry_id, second.entry_id);
        assert_ne!(first.entry_id, first.submission_group_id);
    }
}
