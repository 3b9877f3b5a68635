//! `luneva fonts`: the inline stylesheet a settings document produces.

use std::path::Path;

use luneva_core::content::Settings;
use luneva_storefront::theme::{FontStylesheet, font_stylesheet};
use serde_json::Value;

use super::{CliError, emit, load_document, type_name};

/// # Errors
///
/// Returns an error if the document is not a valid settings document.
pub fn render(document: &Value) -> Result<FontStylesheet, CliError> {
    let found = type_name(document);
    if !found.is_empty() && found != "settings" {
        return Err(CliError::WrongType {
            expected: "settings",
            found: found.to_string(),
        });
    }

    let settings: Settings =
        serde_json::from_value(document.clone()).map_err(|source| CliError::Json {
            path: "settings".to_string(),
            source,
        })?;
    Ok(font_stylesheet(&settings.fonts))
}

/// # Errors
///
/// Returns an error if the file cannot be read or is not a settings
/// document.
pub async fn run(path: &Path) -> Result<(), CliError> {
    let document = load_document(path).await?;
    let stylesheet = render(&document)?;

    if stylesheet.skipped > 0 {
        tracing::warn!(skipped = stylesheet.skipped, "Font faces without a file were left out");
    }
    if stylesheet.is_empty() {
        tracing::info!("Settings document defines no fonts");
        return Ok(());
    }
    emit(&stylesheet.css)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_settings_fonts_render() {
        let stylesheet = render(&json!({
            "_type": "settings",
            "fonts": [{
                "name": "Inter",
                "variableName": "font-primary",
                "weights": [{
                    "weight": "400",
                    "style": "normal",
                    "file": {"asset": {"url": "https://cdn.sanity.io/files/p/d/inter.woff2", "extension": "woff2"}}
                }]
            }]
        }))
        .unwrap();
        assert!(stylesheet.css.contains("font-family: \"Inter\";"));
        assert!(stylesheet.css.contains("--font-primary: Inter;"));
        assert_eq!(stylesheet.skipped, 0);
    }

    #[test]
    fn test_other_document_rejected() {
        let err = render(&json!({"_type": "header"})).unwrap_err();
        assert!(matches!(err, CliError::WrongType { .. }));
    }
}
