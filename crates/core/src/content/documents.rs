//! Singleton and page documents.

use serde::{Deserialize, Serialize};

use super::asset::{Asset, ImageRef};
use super::link::Link;
use super::portable_text::PortableBlock;
use super::section::SectionSlot;

/// CSS custom property every theme exposes for its main typeface.
pub const PRIMARY_FONT_VARIABLE: &str = "font-primary";

/// Site-wide settings singleton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo: Option<ImageRef>,
    #[serde(default)]
    pub favicon: Option<ImageRef>,
    #[serde(default)]
    pub og_image: Option<ImageRef>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub fonts: Vec<FontFamily>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFamily {
    #[serde(default)]
    pub name: String,
    /// Custom property name without the leading `--`.
    #[serde(default)]
    pub variable_name: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub weights: Vec<FontWeight>,
}

impl FontFamily {
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.variable_name.as_deref().map(str::trim) == Some(PRIMARY_FONT_VARIABLE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontWeight {
    /// Numeric weight as a string (`"100"`..`"900"`).
    #[serde(default)]
    pub weight: Option<String>,
    /// `normal` or `italic`.
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub file: Option<FontFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFile {
    #[serde(default)]
    pub asset: Option<Asset>,
}

impl FontWeight {
    #[must_use]
    pub fn weight(&self) -> &str {
        self.weight
            .as_deref()
            .map(str::trim)
            .filter(|weight| !weight.is_empty())
            .unwrap_or("400")
    }

    #[must_use]
    pub fn style(&self) -> &str {
        self.style
            .as_deref()
            .map(str::trim)
            .filter(|style| !style.is_empty())
            .unwrap_or("normal")
    }

    #[must_use]
    pub fn is_italic(&self) -> bool {
        self.style() == "italic"
    }

    fn asset(&self) -> Option<&Asset> {
        self.file.as_ref().and_then(|file| file.asset.as_ref())
    }

    /// Uploaded file URL, if any.
    #[must_use]
    pub fn file_url(&self) -> Option<&str> {
        self.asset()
            .and_then(|asset| asset.url.as_deref())
            .filter(|url| !url.is_empty())
    }

    /// Explicit asset extension, if the content API reported one.
    #[must_use]
    pub fn file_extension(&self) -> Option<&str> {
        self.asset().and_then(|asset| asset.extension.as_deref())
    }

    #[must_use]
    pub fn original_filename(&self) -> Option<&str> {
        self.asset()
            .and_then(|asset| asset.original_filename.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub logo: Option<ImageRef>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub menu: Vec<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footer {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub logo: Option<ImageRef>,
    #[serde(default)]
    pub useful_links: Option<LinkGroup>,
    #[serde(default)]
    pub support: Option<LinkGroup>,
    #[serde(default)]
    pub newsletter: Option<Newsletter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkGroup {
    #[serde(default)]
    pub group_title: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Newsletter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct About {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub main_image: Option<ImageRef>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub content: Vec<PortableBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub faqs: Vec<FaqEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub answer: Vec<PortableBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// The home page: an ordered list of dereferenced section documents.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HomePage {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub sections: Vec<SectionSlot>,
    #[serde(default)]
    pub seo: Option<Seo>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::content::section::Section;

    #[test]
    fn test_settings_fonts_deserialize() {
        let json = r#"{
            "_id": "settings",
            "title": "Luneva",
            "fonts": [{
                "name": "Playfair Display",
                "variableName": "font-heading",
                "weights": [
                    {"weight": "700", "style": "italic", "file": {"asset": {"url": "https://cdn.sanity.io/files/p/d/a.woff2", "extension": "woff2", "originalFilename": "Playfair-BoldItalic.woff2"}}},
                    {"weight": null, "style": null, "file": null}
                ]
            }]
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        let family = &settings.fonts[0];
        assert!(!family.is_primary());
        assert_eq!(family.weights[0].weight(), "700");
        assert!(family.weights[0].is_italic());
        assert_eq!(family.weights[0].file_extension(), Some("woff2"));
        assert_eq!(family.weights[0].original_filename(), Some("Playfair-BoldItalic.woff2"));
        assert_eq!(family.weights[1].weight(), "400");
        assert_eq!(family.weights[1].style(), "normal");
        assert!(family.weights[1].file_url().is_none());
    }

    #[test]
    fn test_home_page_keeps_section_order() {
        let json = r#"{
            "_id": "home",
            "title": "Home",
            "sections": [
                {"_id": "s2", "_type": "perspectiveSection", "items": []},
                {"_id": "s1", "_type": "hero", "title": "First"}
            ],
            "seo": {"title": "Luneva", "description": null}
        }"#;
        let page: HomePage = serde_json::from_str(json).unwrap();
        let ids: Vec<&str> = page
            .sections
            .iter()
            .filter_map(SectionSlot::section)
            .map(Section::id)
            .collect();
        assert_eq!(ids, vec!["s2", "s1"]);
        assert_eq!(page.seo.unwrap().title.as_deref(), Some("Luneva"));
    }

    #[test]
    fn test_footer_groups_tolerate_nulls() {
        let json = r#"{"_id":"footer","usefulLinks":{"groupTitle":"Shop","links":null},"support":null}"#;
        let footer: Footer = serde_json::from_str(json).unwrap();
        assert!(footer.useful_links.unwrap().links.is_empty());
        assert!(footer.support.is_none());
    }
}
