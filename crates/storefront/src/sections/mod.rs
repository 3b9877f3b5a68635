//! Section dispatcher.
//!
//! Turns a page's ordered section slots into rendered HTML fragments, one per
//! renderable section, in input order. Unknown or malformed sections and
//! sections whose template fails are skipped with a warning; a page never
//! fails because of a single section.

mod bento;
mod hero;
mod perspective;
mod text_block;
mod video_banner;

use std::collections::HashMap;

use luneva_core::content::{LinkResolver, Section, SectionSlot};
use thiserror::Error;

use crate::shopify::ProductSummary;

pub use bento::{BentoBlockView, BentoItemView, BentoSection, BlockBody};
pub use hero::HeroSection;
pub use perspective::{PerspectiveItemView, PerspectiveSectionView};
pub use text_block::TextBlockSection;
pub use video_banner::VideoBannerSection;

/// Catalog products fetched for a page, keyed by section id.
pub type SectionProducts = HashMap<String, Vec<ProductSummary>>;

/// Per-request inputs shared by every section renderer.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub links: &'a LinkResolver,
}

/// One rendered section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSection {
    pub id: String,
    pub kind: &'static str,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum SectionError {
    #[error("unknown section type `{0}`")]
    UnknownType(String),

    #[error("invalid `{type_name}` section: {reason}")]
    Invalid { type_name: String, reason: String },

    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

/// Render every renderable slot in order.
#[must_use]
pub fn render_sections(
    slots: &[SectionSlot],
    products: &SectionProducts,
    ctx: &RenderContext<'_>,
) -> Vec<RenderedSection> {
    let mut rendered = Vec::with_capacity(slots.len());

    for slot in slots {
        let (id, result) = match slot {
            SectionSlot::Known(section) => {
                let products = products.get(section.id()).map_or(&[][..], Vec::as_slice);
                (
                    Some(section.id()),
                    render_section(section, products, ctx)
                        .map(|html| html.map(|html| (section.type_name(), html))),
                )
            }
            SectionSlot::Unknown { id, type_name } => (
                id.as_deref(),
                Err(SectionError::UnknownType(type_name.clone())),
            ),
            SectionSlot::Invalid {
                id,
                type_name,
                reason,
            } => (
                id.as_deref(),
                Err(SectionError::Invalid {
                    type_name: type_name.clone(),
                    reason: reason.clone(),
                }),
            ),
        };

        match result {
            Ok(Some((kind, html))) => rendered.push(RenderedSection {
                id: id.unwrap_or_default().to_string(),
                kind,
                html,
            }),
            Ok(None) => {
                tracing::debug!(section_id = id.unwrap_or_default(), "Section has nothing to render");
            }
            Err(e) => {
                tracing::warn!(
                    section_id = id.unwrap_or_default(),
                    error = %e,
                    "Skipping section"
                );
            }
        }
    }

    rendered
}

/// Render one section. `Ok(None)` when the section is empty (a video
/// banner without a video, a gallery without items).
///
/// # Errors
///
/// Returns [`SectionError::Template`] if the section template fails.
pub fn render_section(
    section: &Section,
    products: &[ProductSummary],
    ctx: &RenderContext<'_>,
) -> Result<Option<String>, SectionError> {
    use askama::Template;

    let html = match section {
        Section::Hero(hero) => Some(HeroSection::build(hero, ctx).render()?),
        Section::VideoBanner(banner) => VideoBannerSection::build(banner, ctx)
            .map(|view| view.render())
            .transpose()?,
        Section::TextWithParagraph(text) => Some(TextBlockSection::build(text, ctx).render()?),
        Section::BentoGrid(grid) => Some(BentoSection::build(grid, products, ctx).render()?),
        Section::PerspectiveSection(gallery) => PerspectiveSectionView::build(gallery, ctx)
            .map(|view| view.render())
            .transpose()?,
    };
    Ok(html)
}
