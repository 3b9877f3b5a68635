//! Studio document registry and preview labels.
//!
//! The content studio lists documents with a computed title/subtitle pair.
//! These functions compute the same labels from the stored documents so
//! tooling (and tests) can show exactly what editors see.

use serde_json::Value;
use thiserror::Error;

use crate::content::{
    BentoGrid, BentoItem, FontFamily, FontWeight, Hero, PerspectiveItem, PerspectiveSection,
    Settings, TextWithParagraph, VideoBanner,
};

/// Desk group a document type is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeskGroup {
    Pages,
    Components,
    Settings,
    Other,
}

impl DeskGroup {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Pages => "Pages",
            Self::Components => "Components",
            Self::Settings => "Settings",
            Self::Other => "Other",
        }
    }
}

/// A document type known to the studio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentType {
    pub name: &'static str,
    pub title: &'static str,
    /// Singletons have exactly one live document with a fixed id.
    pub singleton: bool,
    pub group: DeskGroup,
}

pub const DOCUMENT_TYPES: &[DocumentType] = &[
    DocumentType {
        name: "homePage",
        title: "Home Page",
        singleton: false,
        group: DeskGroup::Pages,
    },
    DocumentType {
        name: "about",
        title: "About Us Page",
        singleton: false,
        group: DeskGroup::Pages,
    },
    DocumentType {
        name: "faq",
        title: "FAQ",
        singleton: false,
        group: DeskGroup::Pages,
    },
    DocumentType {
        name: "hero",
        title: "Hero Section",
        singleton: false,
        group: DeskGroup::Components,
    },
    DocumentType {
        name: "videoBanner",
        title: "Video Banner",
        singleton: false,
        group: DeskGroup::Components,
    },
    DocumentType {
        name: "textWithParagraph",
        title: "Text with Paragraph",
        singleton: false,
        group: DeskGroup::Components,
    },
    DocumentType {
        name: "bentoGrid",
        title: "Bento Grid",
        singleton: false,
        group: DeskGroup::Components,
    },
    DocumentType {
        name: "perspectiveSection",
        title: "Perspective Section",
        singleton: false,
        group: DeskGroup::Other,
    },
    DocumentType {
        name: "settings",
        title: "Site Settings",
        singleton: true,
        group: DeskGroup::Settings,
    },
    DocumentType {
        name: "header",
        title: "Header",
        singleton: true,
        group: DeskGroup::Settings,
    },
    DocumentType {
        name: "footer",
        title: "Footer",
        singleton: true,
        group: DeskGroup::Settings,
    },
];

/// Look up a document type by its `_type` name.
#[must_use]
pub fn document_type(name: &str) -> Option<&'static DocumentType> {
    DOCUMENT_TYPES.iter().find(|doc_type| doc_type.name == name)
}

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("document has no _type")]
    MissingType,
    #[error("unknown document type: {0}")]
    UnknownType(String),
    #[error("invalid {type_name} document: {source}")]
    Invalid {
        type_name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A studio list label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub title: String,
    pub subtitle: Option<String>,
}

impl Preview {
    fn new(title: impl Into<String>, subtitle: Option<String>) -> Self {
        Self {
            title: title.into(),
            subtitle,
        }
    }
}

const UNTITLED: &str = "Untitled";

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse<T: serde::de::DeserializeOwned>(type_name: &str, document: &Value) -> Result<T, StudioError> {
    serde_json::from_value(document.clone()).map_err(|source| StudioError::Invalid {
        type_name: type_name.to_string(),
        source,
    })
}

/// Compute the preview label for any stored document.
///
/// # Errors
///
/// Returns `StudioError` when the document has no `_type`, an unknown
/// `_type`, or fields that do not match its type.
pub fn preview_document(document: &Value) -> Result<Preview, StudioError> {
    let type_name = document
        .get("_type")
        .and_then(Value::as_str)
        .ok_or(StudioError::MissingType)?;
    let title_field = || non_empty(document.get("title").and_then(Value::as_str));

    match type_name {
        "hero" => Ok(hero_preview(&parse(type_name, document)?)),
        "videoBanner" => Ok(video_banner_preview(&parse(type_name, document)?)),
        "textWithParagraph" => Ok(text_preview(&parse(type_name, document)?)),
        "perspectiveSection" => {
            let section: PerspectiveSection = parse(type_name, document)?;
            let items = document
                .get("items")
                .filter(|items| !items.is_null())
                .map(|_| section.items.as_slice());
            Ok(perspective_preview(items))
        }
        "bentoGrid" => {
            let grid: BentoGrid = parse(type_name, document)?;
            Ok(Preview::new(
                non_empty(grid.title.as_deref()).unwrap_or(UNTITLED),
                None,
            ))
        }
        "settings" => Ok(settings_preview(&parse(type_name, document)?)),
        "homePage" => Ok(Preview::new(
            title_field().unwrap_or("Home Page"),
            Some("Homepage configuration".to_string()),
        )),
        "header" => Ok(Preview::new("Header Settings", None)),
        "footer" => Ok(Preview::new("Footer Settings", None)),
        "about" | "faq" => Ok(Preview::new(title_field().unwrap_or(UNTITLED), None)),
        other => Err(StudioError::UnknownType(other.to_string())),
    }
}

/// Active components get a check mark; inactive ones say so.
fn activation_subtitle(is_active: bool, detail: Option<&str>) -> String {
    match (is_active, non_empty(detail)) {
        (true, Some(detail)) => format!("✓ {detail}"),
        (true, None) => "✓ Active".to_string(),
        (false, Some(detail)) => detail.to_string(),
        (false, None) => "Inactive".to_string(),
    }
}

#[must_use]
pub fn hero_preview(hero: &Hero) -> Preview {
    Preview::new(
        non_empty(hero.title.as_deref()).unwrap_or(UNTITLED),
        Some(activation_subtitle(hero.is_active, hero.subtitle.as_deref())),
    )
}

#[must_use]
pub fn video_banner_preview(banner: &VideoBanner) -> Preview {
    Preview::new(
        non_empty(banner.title.as_deref()).unwrap_or(UNTITLED),
        Some(activation_subtitle(
            banner.is_active,
            banner.overlay_text.as_deref(),
        )),
    )
}

#[must_use]
pub fn text_preview(section: &TextWithParagraph) -> Preview {
    Preview::new(
        non_empty(section.title.as_deref()).unwrap_or("Untitled Text Section"),
        Some("Text with Paragraph".to_string()),
    )
}

#[must_use]
pub fn perspective_preview(items: Option<&[PerspectiveItem]>) -> Preview {
    let title = items
        .and_then(<[PerspectiveItem]>::first)
        .and_then(|item| non_empty(item.title.as_deref()))
        .unwrap_or("Perspective Section");
    let subtitle = items.map_or_else(
        || "No items".to_string(),
        |items| format!("{} items", items.len()),
    );
    Preview::new(title, Some(subtitle))
}

#[must_use]
pub fn perspective_item_preview(item: &PerspectiveItem) -> Preview {
    Preview::new(
        non_empty(item.title.as_deref()).unwrap_or(UNTITLED),
        non_empty(item.description.as_deref()).map(str::to_string),
    )
}

/// `"<first block type> (<width>, <height>)"` using the raw layout hints.
#[must_use]
pub fn bento_item_preview(item: &BentoItem) -> Preview {
    let block = item.first_block_type().unwrap_or("Unknown");
    let width = non_empty(item.layout.width.as_deref()).unwrap_or("?");
    let height = non_empty(item.layout.height.as_deref()).unwrap_or("?");
    Preview::new(format!("{block} ({width}, {height})"), None)
}

#[must_use]
pub fn settings_preview(settings: &Settings) -> Preview {
    Preview::new(
        non_empty(settings.title.as_deref()).unwrap_or("Site Settings"),
        None,
    )
}

#[must_use]
pub fn font_family_preview(family: &FontFamily) -> Preview {
    let count = family.weights.len();
    let plural = if count == 1 { "" } else { "s" };
    Preview::new(
        family.name.clone(),
        Some(format!(
            "--{} ({count} weight{plural})",
            family.variable_name.as_deref().unwrap_or_default()
        )),
    )
}

#[must_use]
pub fn font_weight_preview(weight: &FontWeight) -> Preview {
    let italic = if weight.is_italic() { " Italic" } else { "" };
    Preview::new(
        format!(
            "Weight: {}{italic}",
            non_empty(weight.weight.as_deref()).unwrap_or("?")
        ),
        Some(
            weight
                .original_filename()
                .map_or_else(|| "No file".to_string(), str::to_string),
        ),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::content::{BentoLayout, ContentBlock, ProductGridBlock};

    #[test]
    fn test_hero_preview_activation() {
        let active = preview_document(&json!({"_type": "hero", "title": "Spring", "subtitle": "New in", "isActive": true})).unwrap();
        assert_eq!(active.title, "Spring");
        assert_eq!(active.subtitle.as_deref(), Some("✓ New in"));

        let active_no_subtitle = preview_document(&json!({"_type": "hero", "title": "Spring", "isActive": true})).unwrap();
        assert_eq!(active_no_subtitle.subtitle.as_deref(), Some("✓ Active"));

        let inactive = preview_document(&json!({"_type": "hero", "title": "Spring"})).unwrap();
        assert_eq!(inactive.subtitle.as_deref(), Some("Inactive"));
    }

    #[test]
    fn test_video_banner_preview_uses_overlay_text() {
        let preview = preview_document(&json!({
            "_type": "videoBanner", "title": "Reel", "overlayText": "Made slowly", "isActive": false
        }))
        .unwrap();
        assert_eq!(preview.subtitle.as_deref(), Some("Made slowly"));
    }

    #[test]
    fn test_text_and_home_previews() {
        let text = preview_document(&json!({"_type": "textWithParagraph"})).unwrap();
        assert_eq!(text.title, "Untitled Text Section");
        assert_eq!(text.subtitle.as_deref(), Some("Text with Paragraph"));

        let home = preview_document(&json!({"_type": "homePage", "sections": []})).unwrap();
        assert_eq!(home.title, "Home Page");
        assert_eq!(home.subtitle.as_deref(), Some("Homepage configuration"));

        let header = preview_document(&json!({"_type": "header"})).unwrap();
        assert_eq!(header.title, "Header Settings");
        let footer = preview_document(&json!({"_type": "footer"})).unwrap();
        assert_eq!(footer.title, "Footer Settings");
        let settings = preview_document(&json!({"_type": "settings", "title": null})).unwrap();
        assert_eq!(settings.title, "Site Settings");
    }

    #[test]
    fn test_perspective_preview() {
        let preview = preview_document(&json!({
            "_type": "perspectiveSection",
            "items": [{"title": "Craft"}, {"title": "Care"}]
        }))
        .unwrap();
        assert_eq!(preview.title, "Craft");
        assert_eq!(preview.subtitle.as_deref(), Some("2 items"));

        let absent = preview_document(&json!({"_type": "perspectiveSection", "items": null})).unwrap();
        assert_eq!(absent.title, "Perspective Section");
        assert_eq!(absent.subtitle.as_deref(), Some("No items"));

        let missing = preview_document(&json!({"_type": "perspectiveSection"})).unwrap();
        assert_eq!(missing.subtitle.as_deref(), Some("No items"));
    }

    #[test]
    fn test_perspective_preview_counts_an_empty_list() {
        let empty = preview_document(&json!({"_type": "perspectiveSection", "items": []})).unwrap();
        assert_eq!(empty.title, "Perspective Section");
        assert_eq!(empty.subtitle.as_deref(), Some("0 items"));
    }

    #[test]
    fn test_bento_item_preview() {
        let item = BentoItem {
            key: None,
            layout: BentoLayout {
                width: Some("half".to_string()),
                ..BentoLayout::default()
            },
            content: vec![ContentBlock::ProductGrid(ProductGridBlock::default())],
        };
        assert_eq!(bento_item_preview(&item).title, "productGrid (half, ?)");
        assert_eq!(bento_item_preview(&BentoItem::default()).title, "Unknown (?, ?)");
    }

    #[test]
    fn test_font_previews() {
        let family: FontFamily = serde_json::from_value(json!({
            "name": "Inter",
            "variableName": "font-primary",
            "weights": [{"weight": "400", "style": "italic", "file": {"asset": {"originalFilename": "Inter-Italic.woff2"}}}]
        }))
        .unwrap();
        let preview = font_family_preview(&family);
        assert_eq!(preview.title, "Inter");
        assert_eq!(preview.subtitle.as_deref(), Some("--font-primary (1 weight)"));

        let weight = font_weight_preview(&family.weights[0]);
        assert_eq!(weight.title, "Weight: 400 Italic");
        assert_eq!(weight.subtitle.as_deref(), Some("Inter-Italic.woff2"));

        let bare = font_weight_preview(&FontWeight {
            weight: Some("700".to_string()),
            ..FontWeight::default()
        });
        assert_eq!(bare.title, "Weight: 700");
        assert_eq!(bare.subtitle.as_deref(), Some("No file"));
    }

    #[test]
    fn test_preview_errors() {
        assert!(matches!(preview_document(&json!({})), Err(StudioError::MissingType)));
        assert!(matches!(
            preview_document(&json!({"_type": "lookbook"})),
            Err(StudioError::UnknownType(name)) if name == "lookbook"
        ));
        assert!(matches!(
            preview_document(&json!({"_type": "hero", "isActive": "yes"})),
            Err(StudioError::Invalid { .. })
        ));
    }

    #[test]
    fn test_registry_lookup() {
        let settings = document_type("settings").unwrap();
        assert!(settings.singleton);
        assert_eq!(settings.group, DeskGroup::Settings);
        assert!(document_type("link").is_none());
        assert_eq!(
            DOCUMENT_TYPES
                .iter()
                .filter(|doc| doc.group == DeskGroup::Components)
                .count(),
            4
        );
    }
}
