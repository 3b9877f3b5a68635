//! Display models shared by page and fragment templates.
//!
//! Templates only ever see these flattened, pre-formatted structs; prices
//! are formatted and URLs resolved before rendering.

use luneva_core::content::{ImageRef, Link, LinkResolver};
use url::form_urlencoded;

use crate::shopify::{CollectionSummary, Image, ProductSummary, SelectedOption};

/// Width requested from the content CDN for full-bleed images.
pub const CONTENT_IMAGE_WIDTH: u32 = 1600;

/// An image ready for an `<img>` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

impl ImageView {
    /// From a commerce image, falling back to `fallback_alt` for alt text.
    #[must_use]
    pub fn from_shopify(image: &Image, fallback_alt: &str) -> Self {
        Self {
            url: image.url.clone(),
            alt: image
                .alt_text
                .clone()
                .filter(|alt| !alt.is_empty())
                .unwrap_or_else(|| fallback_alt.to_string()),
            width: image.width,
            height: image.height,
        }
    }

    /// From a content image, resized on the CDN. `None` until an asset is
    /// uploaded.
    #[must_use]
    pub fn from_content(image: &ImageRef, fallback_alt: &str, width: u32) -> Option<Self> {
        let builder = image.builder()?;
        Some(Self {
            url: builder.width(width).build(),
            alt: image
                .alt
                .clone()
                .filter(|alt| !alt.is_empty())
                .unwrap_or_else(|| fallback_alt.to_string()),
            width: None,
            height: None,
        })
    }
}

/// A resolved navigation link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkView {
    pub title: String,
    pub href: String,
    /// Opens in a new tab with `rel="noopener noreferrer"`.
    pub external: bool,
}

impl LinkView {
    #[must_use]
    pub fn resolve(link: &Link, resolver: &LinkResolver) -> Self {
        let resolved = resolver.resolve(link);
        Self {
            title: link.title().to_string(),
            href: resolved.href,
            external: resolved.external,
        }
    }

    /// A call-to-action with free-form text and href.
    #[must_use]
    pub fn cta(text: &str, href: &str, resolver: &LinkResolver) -> Self {
        let resolved = resolver.classify(href);
        Self {
            title: text.to_string(),
            href: resolved.href,
            external: resolved.external,
        }
    }
}

/// A product card in grids and listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub handle: String,
    pub title: String,
    pub price: String,
    pub url: String,
    pub image: Option<ImageView>,
}

impl From<&ProductSummary> for ProductCardView {
    fn from(product: &ProductSummary) -> Self {
        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            price: product.price.display(),
            url: product_url(&product.handle, &product.selected_options),
            image: product
                .featured_image
                .as_ref()
                .map(|image| ImageView::from_shopify(image, &product.title)),
        }
    }
}

/// A collection card in listings and the featured banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionCardView {
    pub handle: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image: Option<ImageView>,
}

impl From<&CollectionSummary> for CollectionCardView {
    fn from(collection: &CollectionSummary) -> Self {
        Self {
            handle: collection.handle.clone(),
            title: collection.title.clone(),
            description: collection.description.clone(),
            url: format!("/collections/{}", collection.handle),
            image: collection
                .image
                .as_ref()
                .map(|image| ImageView::from_shopify(image, &collection.title)),
        }
    }
}

/// Product URL that preselects a variant through its option values.
///
/// `Default Title` options (single-variant products) are left out.
#[must_use]
pub fn product_url(handle: &str, options: &[SelectedOption]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for option in options.iter().filter(|option| option.value != "Default Title") {
        query.append_pair(&option.name, &option.value);
        any = true;
    }
    if any {
        format!("/products/{handle}?{}", query.finish())
    } else {
        format!("/products/{handle}")
    }
}
