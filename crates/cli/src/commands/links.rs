//! `luneva links`: where a header's or footer's links point.

use std::fmt::Write as _;
use std::path::Path;

use luneva_core::content::{Footer, Header, Link, LinkResolver};
use serde_json::Value;

use super::{CliError, emit, load_document, type_name};

/// Environment variables naming the storefront's own domains.
const DOMAIN_VARS: [&str; 3] = ["PUBLIC_STORE_DOMAIN", "SHOPIFY_STORE", "PUBLIC_CHECKOUT_DOMAIN"];

/// Own domains from the environment (and `.env`), skipping unset ones.
fn configured_domains() -> Vec<String> {
    dotenvy::dotenv().ok();
    DOMAIN_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .filter(|domain| !domain.trim().is_empty())
        .collect()
}

fn write_link(out: &mut String, link: &Link, resolver: &LinkResolver) {
    let resolved = resolver.resolve(link);
    let marker = if resolved.external { "  (external)" } else { "" };
    let _ = writeln!(out, "  {} -> {}{marker}", link.title(), resolved.href);
}

fn parse<T: serde::de::DeserializeOwned>(document: &Value, type_name: &str) -> Result<T, CliError> {
    serde_json::from_value(document.clone()).map_err(|source| CliError::Json {
        path: type_name.to_string(),
        source,
    })
}

/// Render resolved links for a header or footer document.
///
/// # Errors
///
/// Returns an error for any other document type.
pub fn render(document: &Value, resolver: &LinkResolver) -> Result<String, CliError> {
    let mut out = String::new();
    match type_name(document) {
        "header" => {
            let header: Header = parse(document, "header")?;
            out.push_str("Menu\n");
            for link in &header.menu {
                write_link(&mut out, link, resolver);
            }
        }
        "footer" => {
            let footer: Footer = parse(document, "footer")?;
            for group in [footer.useful_links.as_ref(), footer.support.as_ref()]
                .into_iter()
                .flatten()
            {
                let _ = writeln!(out, "{}", group.group_title.as_deref().unwrap_or("Links"));
                for link in &group.links {
                    write_link(&mut out, link, resolver);
                }
            }
        }
        other => {
            return Err(CliError::WrongType {
                expected: "header or footer",
                found: other.to_string(),
            });
        }
    }
    Ok(out)
}

/// # Errors
///
/// Returns an error if the file cannot be read or is not a header or
/// footer document.
pub async fn run(path: &Path, domains: Vec<String>) -> Result<(), CliError> {
    let domains = if domains.is_empty() {
        configured_domains()
    } else {
        domains
    };
    if domains.is_empty() {
        tracing::warn!("No storefront domains configured; every absolute URL counts as external");
    }

    let document = load_document(path).await?;
    emit(&render(&document, &LinkResolver::new(domains))?)
}
