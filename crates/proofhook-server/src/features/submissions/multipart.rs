use std::borrow::Cow;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart},
};

/// One decoded part of a `multipart/form-data` body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub body: Bytes,
}

impl FormPart {
    pub fn new(name: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            body: body.into(),
        }
    }

    /// Body as text; invalid UTF-8 sequences become U+FFFD
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Field name with surrounding whitespace and stray quotes removed
pub fn normalize_field_name(raw: &str) -> String {
    raw.trim().trim_matches('"').to_string()
}

/// Drain the request body into parts, keeping payload order.
///
/// Parts without a name are kept with an empty name; they never match a
/// watched field.
pub async fn read_parts(mut multipart: Multipart) -> Result<Vec<FormPart>, MultipartError> {
    let mut parts = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = normalize_field_name(field.name().unwrap_or(""));
        let file_name = field.file_name().map(str::to_string);
        let body = field.bytes().await?;

        tracing::debug!(field = %name, file_name = ?file_name, size = body.len(), "Read form part");

        parts.push(FormPart {
            name,
            file_name,
            body,
        });
    }

    Ok(parts)
}
