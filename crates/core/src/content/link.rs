//! Navigation links and their resolution to storefront paths.

use serde::{Deserialize, Serialize};
use url::Url;

/// The kind of destination a navigation link points at.
///
/// Unknown kinds from newer content deserialize as [`LinkKind::Unknown`]
/// and resolve like a custom link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkKind {
    #[default]
    Custom,
    Home,
    About,
    Blog,
    AllProducts,
    Collections,
    Collection,
    Faq,
    #[serde(other)]
    Unknown,
}

/// A navigation link as edited in the studio.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "super::null_as_default")]
    pub kind: LinkKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub collection_handle: Option<String>,
}

impl Link {
    /// Convenience constructor for a custom URL link.
    #[must_use]
    pub fn custom(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            kind: LinkKind::Custom,
            url: Some(url.into()),
            collection_handle: None,
        }
    }

    /// Convenience constructor for a link of a fixed kind.
    #[must_use]
    pub fn of_kind(title: impl Into<String>, kind: LinkKind) -> Self {
        Self {
            title: Some(title.into()),
            kind,
            url: None,
            collection_handle: None,
        }
    }

    /// Map the link to a storefront path (or the raw URL for custom links).
    ///
    /// Never fails: a custom link without a URL resolves to `"#"` and a
    /// collection link without a handle to `"/collections/"`.
    #[must_use]
    pub fn resolve_path(&self) -> String {
        match self.kind {
            LinkKind::Home => "/".to_string(),
            LinkKind::About => "/pages/about".to_string(),
            LinkKind::Faq => "/pages/faq".to_string(),
            LinkKind::AllProducts => "/collections/all".to_string(),
            LinkKind::Collections => "/collections".to_string(),
            LinkKind::Collection => format!(
                "/collections/{}",
                self.collection_handle.as_deref().unwrap_or_default().trim()
            ),
            LinkKind::Custom | LinkKind::Blog | LinkKind::Unknown => self
                .url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .unwrap_or("#")
                .to_string(),
        }
    }

    /// Whether the link points somewhere real.
    ///
    /// `false` for a collection link missing its handle and for custom links
    /// with no URL; such links still render, they just go nowhere.
    #[must_use]
    pub fn is_functional(&self) -> bool {
        let path = self.resolve_path();
        path != "#" && path != "/collections/"
    }

    /// Display title, empty when the editor left it blank.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

/// A link resolved for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    pub href: String,
    /// Rendered with `target="_blank" rel="noopener noreferrer"`.
    pub external: bool,
}

/// Resolves links against the storefront's own domains.
///
/// Absolute URLs on an own domain (the public storefront domain, the
/// checkout domain, or any `*.myshopify.com` store) are rewritten to
/// root-relative paths. Other absolute http(s) URLs are external.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkResolver {
    own_hosts: Vec<String>,
}

const PLATFORM_HOST_SUFFIX: &str = ".myshopify.com";

impl LinkResolver {
    /// Build a resolver from host names or URLs of the storefront's domains.
    #[must_use]
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let own_hosts = domains
            .into_iter()
            .filter_map(|domain| normalize_host(domain.as_ref()))
            .collect();
        Self { own_hosts }
    }

    /// Resolve a content link.
    #[must_use]
    pub fn resolve(&self, link: &Link) -> ResolvedLink {
        self.classify(&link.resolve_path())
    }

    /// Classify a raw href (CTA links, rich-text annotations).
    #[must_use]
    pub fn classify(&self, href: &str) -> ResolvedLink {
        let href = href.trim();
        if href.is_empty() {
            return ResolvedLink {
                href: "#".to_string(),
                external: false,
            };
        }

        let Ok(url) = Url::parse(href) else {
            // Relative paths, fragments and anything unparsable stay as-is.
            return ResolvedLink {
                href: href.to_string(),
                external: false,
            };
        };

        if !matches!(url.scheme(), "http" | "https") {
            return ResolvedLink {
                href: href.to_string(),
                external: false,
            };
        }

        let is_own = url.host_str().is_some_and(|host| self.is_own_host(host));
        if is_own {
            let mut path = url.path().to_string();
            if let Some(query) = url.query() {
                path.push('?');
                path.push_str(query);
            }
            if let Some(fragment) = url.fragment() {
                path.push('#');
                path.push_str(fragment);
            }
            return ResolvedLink {
                href: path,
                external: false,
            };
        }

        ResolvedLink {
            href: href.to_string(),
            external: true,
        }
    }

    fn is_own_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        let bare = host.strip_prefix("www.").unwrap_or(&host);
        host.ends_with(PLATFORM_HOST_SUFFIX)
            || self
                .own_hosts
                .iter()
                .any(|own| own == bare || own == &host)
    }
}

fn normalize_host(domain: &str) -> Option<String> {
    let domain = domain.trim();
    if domain.is_empty() {
        return None;
    }
    let host = Url::parse(domain)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| domain.trim_end_matches('/').to_string())
        .to_ascii_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn link(kind: LinkKind) -> Link {
        Link::of_kind("Title", kind)
    }

    #[test]
    fn test_resolve_fixed_kinds() {
        assert_eq!(link(LinkKind::Home).resolve_path(), "/");
        assert_eq!(link(LinkKind::About).resolve_path(), "/pages/about");
        assert_eq!(link(LinkKind::Faq).resolve_path(), "/pages/faq");
        assert_eq!(link(LinkKind::AllProducts).resolve_path(), "/collections/all");
        assert_eq!(link(LinkKind::Collections).resolve_path(), "/collections");
    }

    #[test]
    fn test_resolve_collection_with_handle() {
        for handle in ["new-arrivals", "a", "summer-2025"] {
            let link = Link {
                collection_handle: Some(handle.to_string()),
                ..link(LinkKind::Collection)
            };
            assert_eq!(link.resolve_path(), format!("/collections/{handle}"));
            assert!(link.is_functional());
        }
    }

    #[test]
    fn test_resolve_collection_without_handle_is_non_functional() {
        let link = link(LinkKind::Collection);
        assert_eq!(link.resolve_path(), "/collections/");
        assert!(!link.is_functional());
    }

    #[test]
    fn test_resolve_custom_falls_back_to_hash() {
        assert_eq!(link(LinkKind::Custom).resolve_path(), "#");
        let blank = Link {
            url: Some("   ".to_string()),
            ..link(LinkKind::Custom)
        };
        assert_eq!(blank.resolve_path(), "#");
        assert_eq!(Link::custom("Shop", "/shop").resolve_path(), "/shop");
    }

    #[test]
    fn test_unknown_kind_deserializes_and_uses_url() {
        let link: Link =
            serde_json::from_str(r#"{"title":"X","type":"lookbook","url":"/lookbook"}"#).unwrap();
        assert_eq!(link.kind, LinkKind::Unknown);
        assert_eq!(link.resolve_path(), "/lookbook");

        let link: Link = serde_json::from_str(r#"{"title":"X","type":null}"#).unwrap();
        assert_eq!(link.kind, LinkKind::Custom);
    }

    #[test]
    fn test_deserialize_collection_link() {
        let link: Link = serde_json::from_str(
            r#"{"title":"New","type":"collection","collectionHandle":"new-arrivals","url":null}"#,
        )
        .unwrap();
        assert_eq!(link.resolve_path(), "/collections/new-arrivals");
    }

    #[test]
    fn test_classify_rewrites_own_domains() {
        let resolver = LinkResolver::new(["luneva.example", "https://checkout.luneva.example"]);

        let resolved = resolver.classify("https://www.luneva.example/products/tee?variant=1");
        assert_eq!(resolved.href, "/products/tee?variant=1");
        assert!(!resolved.external);

        let resolved = resolver.classify("https://luneva-dev.myshopify.com/collections/all");
        assert_eq!(resolved.href, "/collections/all");
        assert!(!resolved.external);

        let resolved = resolver.classify("https://checkout.luneva.example/cart");
        assert_eq!(resolved.href, "/cart");
    }

    #[test]
    fn test_classify_external_and_relative() {
        let resolver = LinkResolver::new(["luneva.example"]);

        let resolved = resolver.classify("https://instagram.com/luneva");
        assert!(resolved.external);
        assert_eq!(resolved.href, "https://instagram.com/luneva");

        let resolved = resolver.classify("/pages/about");
        assert!(!resolved.external);

        let resolved = resolver.classify("mailto:hello@luneva.example");
        assert!(!resolved.external);

        assert_eq!(resolver.classify("").href, "#");
    }

    #[test]
    fn test_resolve_link_through_resolver() {
        let resolver = LinkResolver::new(["luneva.example"]);
        let link = Link::custom("Journal", "https://luneva.example/blogs/journal");
        assert_eq!(
            resolver.resolve(&link),
            ResolvedLink {
                href: "/blogs/journal".to_string(),
                external: false
            }
        );
    }
}
