use askama::Template;
use luneva_core::content::TextWithParagraph;

use super::RenderContext;
use crate::portable_text;

#[derive(Template)]
#[template(path = "sections/text_block.html")]
pub struct TextBlockSection {
    pub id: String,
    pub title: String,
    /// Pre-rendered, escaped rich text.
    pub body_html: String,
    pub direction_class: &'static str,
}

impl TextBlockSection {
    #[must_use]
    pub fn build(section: &TextWithParagraph, ctx: &RenderContext<'_>) -> Self {
        Self {
            id: section.id.clone(),
            title: section.title.clone().unwrap_or_default(),
            body_html: portable_text::render(&section.content, ctx.links),
            direction_class: if section.reverse_direction {
                "md:flex-row-reverse"
            } else {
                "md:flex-row"
            },
        }
    }
}
