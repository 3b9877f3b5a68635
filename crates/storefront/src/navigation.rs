//! Header and footer view models.

use luneva_core::content::{Footer, Header, Link, LinkGroup, LinkKind, LinkResolver};

use crate::views::{ImageView, LinkView};

const LOGO_WIDTH: u32 = 320;

/// Menu shown until a header document exists or while its menu is empty.
fn default_menu() -> Vec<Link> {
    vec![
        Link::of_kind("Home", LinkKind::Home),
        Link::of_kind("Collections", LinkKind::Collections),
        Link::of_kind("About", LinkKind::About),
        Link::of_kind("FAQ", LinkKind::Faq),
    ]
}

/// Footer links used when the footer document is missing or failed to load.
fn policy_links() -> Vec<Link> {
    vec![
        Link::custom("Privacy Policy", "/policies/privacy-policy"),
        Link::custom("Refund Policy", "/policies/refund-policy"),
        Link::custom("Shipping Policy", "/policies/shipping-policy"),
        Link::custom("Terms of Service", "/policies/terms-of-service"),
    ]
}

fn copyright(year: i32) -> String {
    format!("\u{a9} {year}. All rights reserved.")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub site_title: String,
    pub logo: Option<ImageView>,
    pub menu: Vec<LinkView>,
}

impl HeaderView {
    #[must_use]
    pub fn build(header: Option<&Header>, site_title: &str, links: &LinkResolver) -> Self {
        let menu = header
            .map(|header| header.menu.clone())
            .filter(|menu| !menu.is_empty())
            .unwrap_or_else(default_menu);

        Self {
            site_title: site_title.to_string(),
            logo: header
                .and_then(|header| header.logo.as_ref())
                .and_then(|logo| ImageView::from_content(logo, site_title, LOGO_WIDTH)),
            menu: menu
                .iter()
                .map(|link| LinkView::resolve(link, links))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkGroupView {
    pub title: String,
    pub links: Vec<LinkView>,
}

impl LinkGroupView {
    fn build(group: &LinkGroup, links: &LinkResolver) -> Self {
        Self {
            title: group.group_title.clone().unwrap_or_default(),
            links: group
                .links
                .iter()
                .map(|link| LinkView::resolve(link, links))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterView {
    pub title: String,
    pub description: String,
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterView {
    pub logo: Option<ImageView>,
    pub groups: Vec<LinkGroupView>,
    pub newsletter: Option<NewsletterView>,
    pub copyright: String,
}

impl FooterView {
    /// Build from the footer document, or the static policy-link footer
    /// when it is absent.
    #[must_use]
    pub fn build(footer: Option<&Footer>, year: i32, links: &LinkResolver) -> Self {
        let Some(footer) = footer else {
            return Self::fallback(year, links);
        };

        Self {
            logo: footer
                .logo
                .as_ref()
                .and_then(|logo| ImageView::from_content(logo, "Footer Logo", LOGO_WIDTH)),
            groups: [footer.useful_links.as_ref(), footer.support.as_ref()]
                .into_iter()
                .flatten()
                .map(|group| LinkGroupView::build(group, links))
                .collect(),
            newsletter: footer.newsletter.as_ref().map(|newsletter| NewsletterView {
                title: newsletter.title.clone().unwrap_or_default(),
                description: newsletter.description.clone().unwrap_or_default(),
                placeholder: newsletter
                    .placeholder
                    .clone()
                    .unwrap_or_else(|| "Email address".to_string()),
            }),
            copyright: copyright(year),
        }
    }

    #[must_use]
    pub fn fallback(year: i32, links: &LinkResolver) -> Self {
        Self {
            logo: None,
            groups: vec![LinkGroupView {
                title: String::new(),
                links: policy_links()
                    .iter()
                    .map(|link| LinkView::resolve(link, links))
                    .collect(),
            }],
            newsletter: None,
            copyright: copyright(year),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn resolver() -> LinkResolver {
        LinkResolver::new(["luneva.com", "luneva.myshopify.com"])
    }

    #[test]
    fn test_header_falls_back_to_default_menu() {
        let view = HeaderView::build(None, "Luneva", &resolver());
        let hrefs: Vec<&str> = view.menu.iter().map(|link| link.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/", "/collections", "/pages/about", "/pages/faq"]);
        assert!(view.logo.is_none());

        let empty = Header::default();
        assert_eq!(HeaderView::build(Some(&empty), "Luneva", &resolver()).menu.len(), 4);
    }

    #[test]
    fn test_header_menu_resolves_links() {
        let header: Header = serde_json::from_str(
            r#"{"_id":"header","menu":[
                {"title":"Shop","type":"collection","collectionHandle":"summer"},
                {"title":"Journal","type":"custom","url":"https://luneva.myshopify.com/blogs/news?page=2"},
                {"title":"Instagram","type":"custom","url":"https://instagram.com/luneva"}
            ]}"#,
        )
        .unwrap();
        let view = HeaderView::build(Some(&header), "Luneva", &resolver());
        assert_eq!(view.menu[0].href, "/collections/summer");
        assert_eq!(view.menu[1].href, "/blogs/news?page=2");
        assert!(!view.menu[1].external);
        assert!(view.menu[2].external);
    }

    #[test]
    fn test_footer_groups_in_order() {
        let footer: Footer = serde_json::from_str(
            r#"{"_id":"footer",
                "usefulLinks":{"groupTitle":"Shop","links":[{"title":"All","type":"allProducts"}]},
                "support":{"groupTitle":"Help","links":[{"title":"FAQ","type":"faq"}]},
                "newsletter":{"title":"Stay close","description":null,"placeholder":null}}"#,
        )
        .unwrap();
        let view = FooterView::build(Some(&footer), 2026, &resolver());
        assert_eq!(view.groups[0].title, "Shop");
        assert_eq!(view.groups[0].links[0].href, "/collections/all");
        assert_eq!(view.groups[1].links[0].href, "/pages/faq");
        assert_eq!(view.newsletter.unwrap().placeholder, "Email address");
        assert_eq!(view.copyright, "\u{a9} 2026. All rights reserved.");
    }

    #[test]
    fn test_footer_fallback_policy_links() {
        let view = FooterView::build(None, 2026, &resolver());
        assert_eq!(view.groups.len(), 1);
        assert_eq!(view.groups[0].links[0].href, "/policies/privacy-policy");
        assert_eq!(view.groups[0].links[3].title, "Terms of Service");
    }
}
