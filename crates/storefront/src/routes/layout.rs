//! The page shell shared by every full page: metadata, header and theme.

use luneva_core::content::Settings;

use crate::loader::RootData;
use crate::middleware::CspNonce;
use crate::navigation::HeaderView;
use crate::state::AppState;
use crate::theme::font_stylesheet;
use crate::views::ImageView;

/// Used when the settings document has no title.
pub const DEFAULT_SITE_TITLE: &str = "Luneva";

const OG_IMAGE_WIDTH: u32 = 1200;

/// `<head>` metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub og_image: Option<String>,
    pub canonical_url: String,
}

impl PageMeta {
    /// Page metadata from the settings document, with optional per-page
    /// overrides. A page title is suffixed with the site title.
    #[must_use]
    pub fn build(
        settings: Option<&Settings>,
        page_title: Option<&str>,
        page_description: Option<&str>,
        canonical_url: String,
    ) -> Self {
        let site_title = site_title(settings);
        let title = match page_title.map(str::trim).filter(|title| !title.is_empty()) {
            Some(page) if page != site_title => format!("{page} | {site_title}"),
            _ => site_title.to_string(),
        };
        let description = page_description
            .filter(|description| !description.trim().is_empty())
            .or_else(|| settings.and_then(|settings| settings.description.as_deref()))
            .unwrap_or_default()
            .to_string();
        let og_image = settings
            .and_then(|settings| settings.og_image.as_ref())
            .and_then(|image| ImageView::from_content(image, site_title, OG_IMAGE_WIDTH))
            .map(|image| image.url);

        Self {
            title,
            description,
            og_image,
            canonical_url,
        }
    }
}

fn site_title(settings: Option<&Settings>) -> &str {
    settings
        .and_then(|settings| settings.title.as_deref())
        .filter(|title| !title.trim().is_empty())
        .unwrap_or(DEFAULT_SITE_TITLE)
}

/// Everything `base.html` renders around the page body.
#[derive(Debug, Clone)]
pub struct Shell {
    pub meta: PageMeta,
    pub header: HeaderView,
    pub favicon: Option<String>,
    /// Inline `@font-face` rules, emitted under `nonce`.
    pub font_css: String,
    pub nonce: String,
}

impl Shell {
    /// Assemble the shell from loaded root data.
    ///
    /// Missing header or settings fall back to the defaults.
    #[must_use]
    pub fn new(
        state: &AppState,
        nonce: CspNonce,
        root: &RootData,
        page_title: Option<&str>,
        page_description: Option<&str>,
        path: &str,
    ) -> Self {
        let settings = root.settings.as_ref();

        let fonts = settings
            .map(|settings| font_stylesheet(&settings.fonts))
            .unwrap_or_default();
        if fonts.skipped > 0 {
            tracing::debug!(skipped = fonts.skipped, "Font faces skipped");
        }

        let canonical_url = format!("{}{path}", state.config().base_url.trim_end_matches('/'));

        Self {
            meta: PageMeta::build(settings, page_title, page_description, canonical_url),
            header: HeaderView::build(root.header.as_ref(), site_title(settings), state.links()),
            favicon: settings
                .and_then(|settings| settings.favicon.as_ref())
                .and_then(|image| image.builder())
                .map(|builder| builder.width(64).build()),
            font_css: fonts.css,
            nonce: nonce.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            title: Some("Luneva".to_string()),
            description: Some("Quiet objects.".to_string()),
            ..Settings::default()
        }
    }

    #[test]
    fn test_page_title_suffixed_with_site_title() {
        let meta = PageMeta::build(Some(&settings()), Some("About"), None, String::new());
        assert_eq!(meta.title, "About | Luneva");
        assert_eq!(meta.description, "Quiet objects.");
    }

    #[test]
    fn test_missing_settings_use_defaults() {
        let meta = PageMeta::build(None, None, None, String::new());
        assert_eq!(meta.title, DEFAULT_SITE_TITLE);
        assert!(meta.description.is_empty());
        assert!(meta.og_image.is_none());
    }

    #[test]
    fn test_seo_description_overrides_settings() {
        let meta = PageMeta::build(Some(&settings()), Some("Luneva"), Some("Home SEO"), String::new());
        assert_eq!(meta.title, "Luneva");
        assert_eq!(meta.description, "Home SEO");
    }
}
