//! Bento grid sections: layout hints and tagged content blocks.
//!
//! Layout hints arrive as free-form strings. Each maps through a fixed
//! class table; anything unrecognised falls back to the documented default
//! (width third, height medium, direction column, alignment start).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::asset::Asset;
use super::portable_text::PortableBlock;

/// Upper bound on products a single grid block may reference.
pub const MAX_GRID_PRODUCTS: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BentoGrid {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub items: Vec<BentoItem>,
}

impl BentoGrid {
    /// Every product handle referenced by the grid, deduplicated in
    /// first-seen order.
    #[must_use]
    pub fn product_handles(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .flat_map(|item| item.content.iter())
            .filter_map(|block| match block {
                ContentBlock::ProductGrid(grid) => Some(grid.handles()),
                _ => None,
            })
            .flatten()
            .filter(|handle| seen.insert(handle.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BentoItem {
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub layout: BentoLayout,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub content: Vec<ContentBlock>,
}

impl BentoItem {
    /// Whether `block` renders as the item's background rather than stacking.
    ///
    /// True for images flagged `isBackground` and for an image that is the
    /// item's only block.
    #[must_use]
    pub fn is_background(&self, block: &ContentBlock) -> bool {
        match block {
            ContentBlock::Image(image) => image.is_background || self.content.len() == 1,
            _ => false,
        }
    }

    /// Tag of the first content block, used for studio previews.
    #[must_use]
    pub fn first_block_type(&self) -> Option<&'static str> {
        self.content.first().and_then(ContentBlock::type_name)
    }
}

/// Raw layout hints as stored in content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BentoLayout {
    #[serde(default)]
    pub width: Option<String>,
    #[serde(default)]
    pub height: Option<String>,
    #[serde(default)]
    pub content_direction: Option<String>,
    #[serde(default)]
    pub align: Option<String>,
}

/// Resolved style classes for one bento item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutClasses {
    pub width: &'static str,
    pub height: &'static str,
    pub direction: &'static str,
    pub align: &'static str,
}

impl BentoLayout {
    #[must_use]
    pub fn width(&self) -> Width {
        Width::from_hint(self.width.as_deref())
    }

    #[must_use]
    pub fn height(&self) -> Height {
        Height::from_hint(self.height.as_deref())
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        Direction::from_hint(self.content_direction.as_deref())
    }

    #[must_use]
    pub fn align(&self) -> Align {
        Align::from_hint(self.align.as_deref())
    }

    #[must_use]
    pub fn classes(&self) -> LayoutClasses {
        LayoutClasses {
            width: self.width().class(),
            height: self.height().class(),
            direction: self.direction().class(),
            align: self.align().class(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Width {
    Full,
    Half,
    #[default]
    Third,
    TwoThirds,
    Quarter,
}

impl Width {
    #[must_use]
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint.map(str::trim) {
            Some("full") => Self::Full,
            Some("half") => Self::Half,
            Some("two-thirds") => Self::TwoThirds,
            Some("quarter") => Self::Quarter,
            _ => Self::Third,
        }
    }

    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Full => "md:col-span-12",
            Self::Half => "md:col-span-6",
            Self::Third => "md:col-span-4",
            Self::TwoThirds => "md:col-span-8",
            Self::Quarter => "md:col-span-3",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Height {
    Short,
    #[default]
    Medium,
    Tall,
}

impl Height {
    #[must_use]
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint.map(str::trim) {
            Some("short") => Self::Short,
            Some("tall") => Self::Tall,
            _ => Self::Medium,
        }
    }

    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Short => "min-h-[250px]",
            Self::Medium => "min-h-[500px]",
            Self::Tall => "min-h-[750px]",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Column,
    Row,
    ColumnReverse,
    RowReverse,
}

impl Direction {
    #[must_use]
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint.map(str::trim) {
            Some("row") => Self::Row,
            Some("column-reverse") => Self::ColumnReverse,
            Some("row-reverse") => Self::RowReverse,
            _ => Self::Column,
        }
    }

    /// Row layouts collapse to a column on small screens.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Column => "flex-col",
            Self::Row => "md:flex-row flex-col",
            Self::ColumnReverse => "flex-col-reverse",
            Self::RowReverse => "md:flex-row-reverse flex-col-reverse",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
    Between,
}

impl Align {
    #[must_use]
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint.map(str::trim) {
            Some("center") => Self::Center,
            Some("end") => Self::End,
            Some("between") => Self::Between,
            _ => Self::Start,
        }
    }

    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Start => "justify-start",
            Self::Center => "justify-center",
            Self::End => "justify-end",
            Self::Between => "justify-between",
        }
    }
}

/// A tagged block inside a bento item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum ContentBlock {
    #[serde(rename = "image")]
    Image(ImageBlock),
    #[serde(rename = "productGrid")]
    ProductGrid(ProductGridBlock),
    #[serde(rename = "richText")]
    RichText(RichTextBlock),
    #[serde(other)]
    Unsupported,
}

impl ContentBlock {
    #[must_use]
    pub const fn type_name(&self) -> Option<&'static str> {
        match self {
            Self::Image(_) => Some("image"),
            Self::ProductGrid(_) => Some("productGrid"),
            Self::RichText(_) => Some("richText"),
            Self::Unsupported => None,
        }
    }

    #[must_use]
    pub const fn expands(&self) -> bool {
        match self {
            Self::Image(block) => block.expand,
            Self::ProductGrid(block) => block.expand,
            Self::RichText(block) => block.expand,
            Self::Unsupported => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBlock {
    #[serde(default)]
    pub asset: Option<Asset>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_background: bool,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub expand: bool,
}

impl ImageBlock {
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.asset
            .as_ref()
            .and_then(|asset| asset.url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    #[serde(default)]
    pub handle: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductGridBlock {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub products: Vec<ProductRef>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub expand: bool,
}

impl ProductGridBlock {
    /// Non-empty handles in editor order, capped at [`MAX_GRID_PRODUCTS`].
    #[must_use]
    pub fn handles(&self) -> Vec<String> {
        self.products
            .iter()
            .filter_map(|product| product.handle.as_deref())
            .map(str::trim)
            .filter(|handle| !handle.is_empty())
            .take(MAX_GRID_PRODUCTS)
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub text: Vec<PortableBlock>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub expand: bool,
}
