//! Command implementations.
//!
//! Each command renders its output to a `String` first so the formatting
//! can be tested without touching stdout.

pub mod fonts;
pub mod links;
pub mod preview;
pub mod schema;

use std::io::Write;
use std::path::Path;

use luneva_core::studio::StudioError;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Studio(#[from] StudioError),

    #[error("expected a {expected} document, found {found}")]
    WrongType { expected: &'static str, found: String },

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Read a document file as JSON, or YAML by extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_document(path: &Path) -> Result<Value, CliError> {
    let display = path.display().to_string();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: display.clone(),
            source,
        })?;

    parse_document(&content, is_yaml(path), &display)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

fn parse_document(content: &str, yaml: bool, path: &str) -> Result<Value, CliError> {
    if yaml {
        serde_yaml::from_str(content).map_err(|source| CliError::Yaml {
            path: path.to_string(),
            source,
        })
    } else {
        serde_json::from_str(content).map_err(|source| CliError::Json {
            path: path.to_string(),
            source,
        })
    }
}

/// The document's `_type`, or an empty string.
fn type_name(document: &Value) -> &str {
    document.get("_type").and_then(Value::as_str).unwrap_or_default()
}

/// Write rendered output to stdout.
fn emit(output: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_detection_by_extension() {
        assert!(is_yaml(Path::new("settings.yaml")));
        assert!(is_yaml(Path::new("settings.YML")));
        assert!(!is_yaml(Path::new("settings.json")));
        assert!(!is_yaml(Path::new("settings")));
    }

    #[test]
    fn test_yaml_and_json_parse_to_same_value() {
        let json = parse_document(r#"{"_type": "header", "menu": []}"#, false, "a.json").unwrap();
        let yaml = parse_document("_type: header\nmenu: []\n", true, "a.yaml").unwrap();
        assert_eq!(json, yaml);
        assert_eq!(type_name(&json), "header");
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = parse_document("{", false, "broken.json").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
