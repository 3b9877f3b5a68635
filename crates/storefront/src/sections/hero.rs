use askama::Template;
use luneva_core::content::Hero;

use super::RenderContext;
use crate::views::{CONTENT_IMAGE_WIDTH, ImageView, LinkView};

#[derive(Template)]
#[template(path = "sections/hero.html")]
pub struct HeroSection {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub image: Option<ImageView>,
    pub cta: Option<LinkView>,
}

impl HeroSection {
    /// The call-to-action renders only when both its text and link are set.
    #[must_use]
    pub fn build(hero: &Hero, ctx: &RenderContext<'_>) -> Self {
        let title = hero.title.clone().unwrap_or_default();
        let cta = match (non_empty(hero.cta_text.as_deref()), non_empty(hero.cta_link.as_deref())) {
            (Some(text), Some(link)) => Some(LinkView::cta(text, link, ctx.links)),
            _ => None,
        };

        Self {
            id: hero.id.clone(),
            image: hero
                .image
                .as_ref()
                .and_then(|image| ImageView::from_content(image, &title, CONTENT_IMAGE_WIDTH)),
            subtitle: non_empty(hero.subtitle.as_deref()).map(str::to_string),
            title,
            cta,
        }
    }
}

pub(super) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
