use askama::Template;
use luneva_core::content::PerspectiveSection;

use super::RenderContext;
use super::hero::non_empty;
use crate::views::{ImageView, LinkView};

const ITEM_IMAGE_WIDTH: u32 = 900;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerspectiveItemView {
    pub image: Option<ImageView>,
    pub title: String,
    pub description: Option<String>,
    pub button: Option<LinkView>,
}

#[derive(Template)]
#[template(path = "sections/perspective.html")]
pub struct PerspectiveSectionView {
    pub id: String,
    pub items: Vec<PerspectiveItemView>,
}

impl PerspectiveSectionView {
    /// `None` for a gallery without items.
    #[must_use]
    pub fn build(section: &PerspectiveSection, ctx: &RenderContext<'_>) -> Option<Self> {
        if section.items.is_empty() {
            return None;
        }

        let items = section
            .items
            .iter()
            .map(|item| {
                let title = item.title.clone().unwrap_or_default();
                let button = match (
                    non_empty(item.button_text.as_deref()),
                    non_empty(item.button_link.as_deref()),
                ) {
                    (Some(text), Some(link)) => Some(LinkView::cta(text, link, ctx.links)),
                    _ => None,
                };
                PerspectiveItemView {
                    image: item
                        .image
                        .as_ref()
                        .and_then(|image| ImageView::from_content(image, &title, ITEM_IMAGE_WIDTH)),
                    description: non_empty(item.description.as_deref()).map(str::to_string),
                    title,
                    button,
                }
            })
            .collect();

        Some(Self {
            id: section.id.clone(),
            items,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use luneva_core::content::LinkResolver;

    use super::*;

    #[test]
    fn test_items_keep_editor_order() {
        let resolver = LinkResolver::new(["luneva.com"]);
        let ctx = RenderContext { links: &resolver };
        let section: PerspectiveSection = serde_json::from_str(
            r#"{"_id":"p","items":[
                {"_key":"a","title":"Morning","buttonText":"See","buttonLink":"https://elsewhere.test/x"},
                {"_key":"b","title":"Evening","buttonText":"See"}
            ]}"#,
        )
        .unwrap();
        let view = PerspectiveSectionView::build(&section, &ctx).unwrap();
        assert_eq!(view.items[0].title, "Morning");
        assert!(view.items[0].button.as_ref().unwrap().external);
        assert!(view.items[1].button.is_none());

        let html = view.render().unwrap();
        let morning = html.find("Morning").unwrap();
        let evening = html.find("Evening").unwrap();
        assert!(morning < evening);
        assert!(html.contains("rel=\"noopener noreferrer\""));
    }
}
