//! Content asset references and the CDN image URL builder.

use serde::{Deserialize, Serialize};
use url::Url;

/// A dereferenced asset (`asset->{_id, url, extension, originalFilename}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
}

/// An image field: an asset plus optional alt text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub asset: Option<Asset>,
    #[serde(default)]
    pub alt: Option<String>,
}

impl ImageRef {
    /// The CDN URL of the underlying asset, if it has been uploaded.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.asset
            .as_ref()
            .and_then(|asset| asset.url.as_deref())
            .filter(|url| !url.is_empty())
    }

    /// Start building a transformed CDN URL for this image.
    #[must_use]
    pub fn builder(&self) -> Option<ImageUrlBuilder> {
        self.url().map(ImageUrlBuilder::new)
    }
}

/// Output formats the image CDN can convert to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpg,
    Png,
    Webp,
}

impl ImageFormat {
    const fn as_param(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

const TRANSFORM_PARAMS: &[&str] = &["w", "h", "q", "fm", "auto"];

/// Builds CDN image URLs with transform parameters.
///
/// Always requests `auto=format` so the CDN can negotiate modern formats.
/// Existing transform parameters on the source URL are replaced; any other
/// query parameters are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrlBuilder {
    source: String,
    width: Option<u32>,
    height: Option<u32>,
    quality: Option<u8>,
    format: Option<ImageFormat>,
}

impl ImageUrlBuilder {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            width: None,
            height: None,
            quality: None,
            format: None,
        }
    }

    #[must_use]
    pub const fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub const fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Quality 1-100; values above 100 are clamped.
    #[must_use]
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality.min(100));
        self
    }

    #[must_use]
    pub const fn format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Render the final URL.
    ///
    /// A source that is not an absolute URL is returned unchanged.
    #[must_use]
    pub fn build(&self) -> String {
        let Ok(mut url) = Url::parse(&self.source) else {
            return self.source.clone();
        };

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !TRANSFORM_PARAMS.contains(&key.as_ref()))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, value) in &kept {
                pairs.append_pair(key, value);
            }
            if let Some(width) = self.width {
                pairs.append_pair("w", &width.to_string());
            }
            if let Some(height) = self.height {
                pairs.append_pair("h", &height.to_string());
            }
            if let Some(quality) = self.quality {
                pairs.append_pair("q", &quality.to_string());
            }
            if let Some(format) = self.format {
                pairs.append_pair("fm", format.as_param());
            }
            pairs.append_pair("auto", "format");
        }

        url.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SOURCE: &str = "https://cdn.sanity.io/images/abc/production/hash-800x600.jpg";

    #[test]
    fn test_builder_default_requests_auto_format() {
        let url = ImageUrlBuilder::new(SOURCE).build();
        assert_eq!(url, format!("{SOURCE}?auto=format"));
    }

    #[test]
    fn test_builder_applies_all_transforms() {
        let url = ImageUrlBuilder::new(SOURCE)
            .width(400)
            .height(300)
            .quality(80)
            .format(ImageFormat::Webp)
            .build();
        assert_eq!(url, format!("{SOURCE}?w=400&h=300&q=80&fm=webp&auto=format"));
    }

    #[test]
    fn test_builder_replaces_existing_transforms_and_keeps_others() {
        let url = ImageUrlBuilder::new(format!("{SOURCE}?w=10&dl=file.jpg"))
            .width(20)
            .build();
        assert_eq!(url, format!("{SOURCE}?dl=file.jpg&w=20&auto=format"));
    }

    #[test]
    fn test_builder_quality_is_clamped() {
        let url = ImageUrlBuilder::new(SOURCE).quality(250).build();
        assert!(url.contains("q=100"));
    }

    #[test]
    fn test_builder_passes_through_relative_source() {
        assert_eq!(ImageUrlBuilder::new("/static/logo.png").build(), "/static/logo.png");
    }

    #[test]
    fn test_image_ref_url_ignores_empty_asset() {
        let image: ImageRef = serde_json::from_str(r#"{"asset": {"url": ""}}"#).unwrap();
        assert!(image.url().is_none());

        let image: ImageRef = serde_json::from_str(r#"{"asset": null}"#).unwrap();
        assert!(image.builder().is_none());
    }
}
