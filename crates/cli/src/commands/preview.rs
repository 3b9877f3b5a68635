//! `luneva preview`: studio list labels for exported documents.

use std::fmt::Write as _;
use std::path::Path;

use luneva_core::studio::{Preview, preview_document};
use serde_json::Value;

use super::{CliError, emit, load_document, type_name};

fn write_preview(out: &mut String, type_name: &str, preview: &Preview) {
    let _ = writeln!(out, "[{type_name}] {}", preview.title);
    if let Some(subtitle) = &preview.subtitle {
        let _ = writeln!(out, "    {subtitle}");
    }
}

/// Render labels for one document or an array of documents.
///
/// # Errors
///
/// Returns the first document that has no label.
pub fn render(documents: &Value) -> Result<String, CliError> {
    let documents = match documents {
        Value::Array(documents) => documents.as_slice(),
        document => std::slice::from_ref(document),
    };

    let mut out = String::new();
    for document in documents {
        let preview = preview_document(document)?;
        write_preview(&mut out, type_name(document), &preview);
    }
    Ok(out)
}

/// # Errors
///
/// Returns an error if the file cannot be read or a document is invalid.
pub async fn run(path: &Path) -> Result<(), CliError> {
    let documents = load_document(path).await?;
    emit(&render(&documents)?)
}
