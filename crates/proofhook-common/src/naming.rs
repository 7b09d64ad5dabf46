//! Object naming for persisted proof records
//!
//! Proof records live at `<prefix>/<invoiceNumber>/<freshId>`. The fresh id keeps
//! concurrent and repeated submissions for the same invoice from colliding.
//! An empty invoice number is kept as an empty path segment rather than rejected,
//! so every extracted record still gets written somewhere.

use uuid::Uuid;

/// Directory holding every proof record of one invoice
pub fn proof_directory(prefix: &str, invoice_number: &str) -> String {
    format!("{}/{}", prefix, invoice_number)
}

/// Full object path of one record inside `directory`
pub fn object_path(directory: &str, fresh_id: &str) -> String {
    format!("{}/{}", directory, fresh_id)
}

/// Fresh identifier used only for path uniqueness
pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}
