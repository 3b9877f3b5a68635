//! Page sections: a closed tagged union keyed by the content `_type`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::asset::ImageRef;
use super::bento::BentoGrid;
use super::portable_text::PortableBlock;

/// Section tags the storefront knows how to render.
pub const SECTION_TYPES: &[&str] = &[
    "hero",
    "videoBanner",
    "textWithParagraph",
    "bentoGrid",
    "perspectiveSection",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum Section {
    #[serde(rename = "hero")]
    Hero(Hero),
    #[serde(rename = "videoBanner")]
    VideoBanner(VideoBanner),
    #[serde(rename = "textWithParagraph")]
    TextWithParagraph(TextWithParagraph),
    #[serde(rename = "bentoGrid")]
    BentoGrid(BentoGrid),
    #[serde(rename = "perspectiveSection")]
    PerspectiveSection(PerspectiveSection),
}

impl Section {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Hero(section) => &section.id,
            Self::VideoBanner(section) => &section.id,
            Self::TextWithParagraph(section) => &section.id,
            Self::BentoGrid(section) => &section.id,
            Self::PerspectiveSection(section) => &section.id,
        }
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Hero(_) => "hero",
            Self::VideoBanner(_) => "videoBanner",
            Self::TextWithParagraph(_) => "textWithParagraph",
            Self::BentoGrid(_) => "bentoGrid",
            Self::PerspectiveSection(_) => "perspectiveSection",
        }
    }
}

/// One entry of a page's section list, decoded leniently.
///
/// The section list never fails to deserialize as a whole: entries with an
/// unknown tag, a dangling reference (`null`), or a payload that does not
/// match its tag are preserved as non-renderable slots so the renderer can
/// report and skip them.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionSlot {
    Known(Section),
    Unknown {
        id: Option<String>,
        type_name: String,
    },
    Invalid {
        id: Option<String>,
        type_name: String,
        reason: String,
    },
}

impl SectionSlot {
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let type_name = value
            .get("_type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let id = value.get("_id").and_then(Value::as_str).map(str::to_string);

        if !SECTION_TYPES.contains(&type_name.as_str()) {
            return Self::Unknown { id, type_name };
        }

        match serde_json::from_value::<Section>(value) {
            Ok(section) => Self::Known(section),
            Err(err) => Self::Invalid {
                id,
                type_name,
                reason: err.to_string(),
            },
        }
    }

    #[must_use]
    pub const fn section(&self) -> Option<&Section> {
        match self {
            Self::Known(section) => Some(section),
            Self::Unknown { .. } | Self::Invalid { .. } => None,
        }
    }
}

impl From<Section> for SectionSlot {
    fn from(section: Section) -> Self {
        Self::Known(section)
    }
}

impl<'de> Deserialize<'de> for SectionSlot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub cta_text: Option<String>,
    #[serde(default)]
    pub cta_link: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoBanner {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Video file URL (projected from `video.asset->url`).
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub mobile_video: Option<String>,
    #[serde(default)]
    pub poster_image: Option<ImageRef>,
    #[serde(default)]
    pub overlay_text: Option<String>,
    #[serde(default)]
    pub overlay_subtext: Option<String>,
    #[serde(default)]
    pub cta_text: Option<String>,
    #[serde(default)]
    pub cta_link: Option<String>,
    #[serde(default)]
    pub autoplay: Option<bool>,
    #[serde(rename = "loop", default)]
    pub loop_video: Option<bool>,
    #[serde(default)]
    pub muted: Option<bool>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_active: bool,
}

impl VideoBanner {
    /// Playback flags default to on when unset.
    #[must_use]
    pub fn autoplay(&self) -> bool {
        self.autoplay.unwrap_or(true)
    }

    #[must_use]
    pub fn loops(&self) -> bool {
        self.loop_video.unwrap_or(true)
    }

    #[must_use]
    pub fn muted(&self) -> bool {
        self.muted.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextWithParagraph {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub content: Vec<PortableBlock>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub reverse_direction: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerspectiveSection {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub items: Vec<PerspectiveItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerspectiveItem {
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default)]
    pub button_link: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_from_mixed_section_list() {
        let json = r#"[
            {"_id": "h1", "_type": "hero", "title": "Hello", "isActive": true},
            {"_id": "x1", "_type": "countdownTimer", "endsAt": "2025-01-01"},
            null,
            {"_id": "t1", "_type": "textWithParagraph", "title": "About", "content": null, "reverseDirection": null},
            {"_id": "b1", "_type": "bentoGrid", "items": "not-a-list"}
        ]"#;
        let slots: Vec<SectionSlot> = serde_json::from_str(json).unwrap();
        assert_eq!(slots.len(), 5);

        let Some(Section::Hero(hero)) = slots[0].section() else {
            panic!("expected hero");
        };
        assert_eq!(hero.title.as_deref(), Some("Hello"));
        assert!(hero.is_active);

        assert_eq!(
            slots[1],
            SectionSlot::Unknown {
                id: Some("x1".to_string()),
                type_name: "countdownTimer".to_string()
            }
        );
        assert!(matches!(&slots[2], SectionSlot::Unknown { id: None, type_name } if type_name.is_empty()));
        assert_eq!(slots[3].section().map(Section::type_name), Some("textWithParagraph"));
        assert!(matches!(&slots[4], SectionSlot::Invalid { type_name, .. } if type_name == "bentoGrid"));
    }

    #[test]
    fn test_video_banner_flags_default_on() {
        let banner: VideoBanner =
            serde_json::from_str(r#"{"_id":"v","video":"https://cdn/x.mp4","loop":false}"#).unwrap();
        assert!(banner.autoplay());
        assert!(!banner.loops());
        assert!(banner.muted());
    }

    #[test]
    fn test_section_id_and_type() {
        let section = Section::PerspectiveSection(PerspectiveSection {
            id: "p1".to_string(),
            items: vec![],
        });
        assert_eq!(section.id(), "p1");
        assert_eq!(section.type_name(), "perspectiveSection");
    }
}
