//! Content documents served by the structured-content API.
//!
//! Every type here deserializes from the JSON produced by the storefront's
//! GROQ projections. The content API returns `null` for any field an editor
//! left empty, so list and flag fields go through [`null_as_default`].

pub mod asset;
pub mod bento;
pub mod documents;
pub mod link;
pub mod portable_text;
pub mod section;

pub use asset::{Asset, ImageFormat, ImageRef, ImageUrlBuilder};
pub use bento::{
    Align, BentoGrid, BentoItem, BentoLayout, ContentBlock, Direction, Height, ImageBlock,
    LayoutClasses, MAX_GRID_PRODUCTS, ProductGridBlock, ProductRef, RichTextBlock, Width,
};
pub use documents::{
    About, Faq, FaqEntry, FontFamily, FontFile, FontWeight, Footer, Header, HomePage, LinkGroup,
    Newsletter, PRIMARY_FONT_VARIABLE, Seo, Settings,
};
pub use link::{Link, LinkKind, LinkResolver, ResolvedLink};
pub use portable_text::{MarkDef, PortableBlock, Span, TextBlock, plain_text};
pub use section::{
    Hero, PerspectiveItem, PerspectiveSection, SECTION_TYPES, Section, SectionSlot,
    TextWithParagraph, VideoBanner,
};

use serde::{Deserialize, Deserializer};

/// Deserialize an optional value, substituting `T::default()` for `null`.
///
/// # Errors
///
/// Propagates the deserializer's error when the value is present but malformed.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
