//! Font stylesheet generation from the settings document.
//!
//! The output is injected inline (under the request's CSP nonce) in the
//! document head. Generation is pure: identical families produce
//! byte-identical CSS.

use std::fmt::Write as _;

use luneva_core::content::{FontFamily, FontWeight, PRIMARY_FONT_VARIABLE};
use url::Url;

/// Generated CSS plus the number of faces left out for missing files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontStylesheet {
    pub css: String,
    pub skipped: usize,
}

impl FontStylesheet {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.css.is_empty()
    }
}

/// `format()` hint for a font file extension.
#[must_use]
pub fn font_format(extension: &str) -> &'static str {
    match extension.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
        "ttf" => "truetype",
        "otf" => "opentype",
        "woff" => "woff",
        _ => "woff2",
    }
}

/// Build `@font-face` rules and the `:root` custom properties.
#[must_use]
pub fn font_stylesheet(families: &[FontFamily]) -> FontStylesheet {
    let mut css = String::new();
    let mut skipped = 0;
    let mut properties: Vec<(String, String)> = Vec::new();

    for family in families {
        let name = sanitize_name(&family.name);
        if name.is_empty() {
            tracing::warn!("Skipping font family without a name");
            continue;
        }

        for weight in &family.weights {
            match face_source(weight) {
                Some((url, format)) => {
                    let _ = write!(
                        css,
                        "@font-face {{\n  font-family: \"{name}\";\n  src: url(\"{url}\") format(\"{format}\");\n  font-weight: {};\n  font-style: {};\n  font-display: swap;\n}}\n",
                        sanitize_weight(weight.weight()),
                        sanitize_style(weight.style()),
                    );
                }
                None => {
                    skipped += 1;
                    tracing::warn!(
                        family = %name,
                        weight = weight.weight(),
                        style = weight.style(),
                        "Skipping font face without a usable file URL"
                    );
                }
            }
        }

        match family.variable_name.as_deref().and_then(sanitize_variable) {
            Some(variable) => properties.push((variable, css_family_value(&name))),
            None => tracing::warn!(family = %name, "Font family has no CSS variable"),
        }
    }

    let has_primary = families.iter().any(FontFamily::is_primary);
    if !has_primary
        && let Some(first) = families
            .iter()
            .map(|family| sanitize_name(&family.name))
            .find(|name| !name.is_empty())
    {
        properties.push((PRIMARY_FONT_VARIABLE.to_string(), css_family_value(&first)));
    }

    if !properties.is_empty() {
        css.push_str(":root {\n");
        for (variable, value) in &properties {
            let _ = writeln!(css, "  --{variable}: {value};");
        }
        css.push_str("}\n");
    }

    FontStylesheet { css, skipped }
}

fn face_source(weight: &FontWeight) -> Option<(String, &'static str)> {
    let url = Url::parse(weight.file_url()?).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let extension = weight
        .file_extension()
        .map(str::to_string)
        .or_else(|| extension_from_path(url.path()))
        .unwrap_or_default();
    Some((url.to_string(), font_format(&extension)))
}

fn extension_from_path(path: &str) -> Option<String> {
    let file = path.rsplit('/').next()?;
    let (_, extension) = file.rsplit_once('.')?;
    Some(extension.to_ascii_lowercase())
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '"' | '\'' | ';' | '{' | '}' | '\\' | '<' | '>') && !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

fn sanitize_variable(variable: &str) -> Option<String> {
    let variable: String = variable
        .trim()
        .trim_start_matches("--")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    (!variable.is_empty()).then_some(variable)
}

fn sanitize_weight(weight: &str) -> &str {
    if !weight.is_empty() && weight.chars().all(|c| c.is_ascii_digit()) {
        weight
    } else {
        "400"
    }
}

fn sanitize_style(style: &str) -> &'static str {
    match style {
        "italic" => "italic",
        "oblique" => "oblique",
        _ => "normal",
    }
}

fn css_family_value(name: &str) -> String {
    if name.contains(' ') {
        format!("\"{name}\"")
    } else {
        name.to_string()
    }
}
