use askama::Template;
use luneva_core::content::{BentoGrid, BentoItem, ContentBlock, ImageBlock, ImageUrlBuilder};

use super::RenderContext;
use crate::portable_text;
use crate::shopify::ProductSummary;
use crate::views::{CONTENT_IMAGE_WIDTH, ImageView, ProductCardView};

/// What a single content block renders as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockBody {
    Image(ImageView),
    Products(Vec<ProductCardView>),
    /// A product grid whose handles matched nothing in the catalog.
    NeedsProducts,
    RichText(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BentoBlockView {
    pub body: BlockBody,
    pub expand: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BentoItemView {
    /// Layout classes from the fixed width/height/direction/alignment table.
    pub classes: String,
    pub background: Option<ImageView>,
    pub blocks: Vec<BentoBlockView>,
}

#[derive(Template)]
#[template(path = "sections/bento.html")]
pub struct BentoSection {
    pub id: String,
    pub title: Option<String>,
    pub items: Vec<BentoItemView>,
}

impl BentoSection {
    /// Build the grid, resolving product handles against `products`.
    ///
    /// Handles missing from `products` are dropped; a grid block left with
    /// no products renders a placeholder.
    #[must_use]
    pub fn build(grid: &BentoGrid, products: &[ProductSummary], ctx: &RenderContext<'_>) -> Self {
        Self {
            id: grid.id.clone(),
            title: grid.title.clone().filter(|title| !title.trim().is_empty()),
            items: grid
                .items
                .iter()
                .map(|item| build_item(item, products, ctx))
                .collect(),
        }
    }
}

fn build_item(item: &BentoItem, products: &[ProductSummary], ctx: &RenderContext<'_>) -> BentoItemView {
    let layout = item.layout.classes();
    let mut background = None;
    let mut blocks = Vec::with_capacity(item.content.len());

    for block in &item.content {
        if item.is_background(block) {
            if let ContentBlock::Image(image) = block
                && background.is_none()
            {
                background = image_view(image);
            }
            continue;
        }

        let body = match block {
            ContentBlock::Image(image) => match image_view(image) {
                Some(view) => BlockBody::Image(view),
                None => continue,
            },
            ContentBlock::ProductGrid(grid) => {
                let cards: Vec<ProductCardView> = grid
                    .handles()
                    .iter()
                    .filter_map(|handle| products.iter().find(|product| &product.handle == handle))
                    .map(ProductCardView::from)
                    .collect();
                if cards.is_empty() {
                    BlockBody::NeedsProducts
                } else {
                    BlockBody::Products(cards)
                }
            }
            ContentBlock::RichText(text) => {
                BlockBody::RichText(portable_text::render(&text.text, ctx.links))
            }
            ContentBlock::Unsupported => {
                tracing::debug!("Skipping unsupported bento block");
                continue;
            }
        };

        blocks.push(BentoBlockView {
            body,
            expand: block.expands(),
        });
    }

    BentoItemView {
        classes: format!(
            "{} {} {} {}",
            layout.width, layout.height, layout.direction, layout.align
        ),
        background,
        blocks,
    }
}

fn image_view(image: &ImageBlock) -> Option<ImageView> {
    let url = image.url()?;
    let builder = ImageUrlBuilder::new(url).width(CONTENT_IMAGE_WIDTH);
    Some(ImageView {
        url: builder.build(),
        alt: image.alt.clone().unwrap_or_default(),
        width: None,
        height: None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use luneva_core::content::LinkResolver;
    use luneva_core::types::Price;

    use super::*;

    fn product(handle: &str) -> ProductSummary {
        ProductSummary {
            id: format!("gid://shopify/Product/{handle}"),
            handle: handle.to_string(),
            title: handle.to_uppercase(),
            price: Price::parse("12.00", "EUR").unwrap(),
            featured_image: None,
            selected_options: Vec::new(),
        }
    }

    fn grid(json: &str) -> BentoGrid {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_products_resolved_in_editor_order_misses_dropped() {
        let resolver = LinkResolver::default();
        let ctx = RenderContext { links: &resolver };
        let grid = grid(
            r#"{"_id":"b","items":[{"layout":{"width":"half"},"content":[
                {"_type":"productGrid","products":[{"handle":"b"},{"handle":"missing"},{"handle":"a"}]}
            ]}]}"#,
        );
        let view = BentoSection::build(&grid, &[product("a"), product("b")], &ctx);
        let BlockBody::Products(cards) = &view.items[0].blocks[0].body else {
            panic!("expected products");
        };
        let handles: Vec<&str> = cards.iter().map(|card| card.handle.as_str()).collect();
        assert_eq!(handles, vec!["b", "a"]);
    }

    #[test]
    fn test_unresolved_grid_renders_placeholder() {
        let resolver = LinkResolver::default();
        let ctx = RenderContext { links: &resolver };
        let grid = grid(
            r#"{"_id":"b","items":[{"content":[{"_type":"productGrid","products":[{"handle":"gone"}]}]}]}"#,
        );
        let view = BentoSection::build(&grid, &[], &ctx);
        assert_eq!(view.items[0].blocks[0].body, BlockBody::NeedsProducts);
        assert!(view.render().unwrap().contains("Add products in Sanity"));
    }

    #[test]
    fn test_layout_classes_and_background() {
        let resolver = LinkResolver::default();
        let ctx = RenderContext { links: &resolver };
        let grid = grid(
            r#"{"_id":"b","items":[
                {"layout":{"width":"diagonal","height":"tall","contentDirection":"row","align":"center"},
                 "content":[{"_type":"image","asset":{"url":"https://cdn.sanity.io/images/p/d/only.jpg"}}]},
                {"content":[
                    {"_type":"image","isBackground":true,"asset":{"url":"https://cdn.sanity.io/images/p/d/bg.jpg"}},
                    {"_type":"image","asset":{"url":"https://cdn.sanity.io/images/p/d/fg.jpg"},"expand":true},
                    {"_type":"richText","text":[{"_type":"block","children":[{"text":"Hello"}]}]}
                ]}
            ]}"#,
        );
        let view = BentoSection::build(&grid, &[], &ctx);

        let first = &view.items[0];
        assert_eq!(
            first.classes,
            "md:col-span-4 min-h-[750px] md:flex-row flex-col justify-center"
        );
        assert!(first.background.as_ref().unwrap().url.contains("only.jpg"));
        assert!(first.blocks.is_empty());

        let second = &view.items[1];
        assert!(second.background.as_ref().unwrap().url.contains("bg.jpg"));
        assert_eq!(second.blocks.len(), 2);
        assert!(second.blocks[0].expand);
        assert_eq!(second.blocks[1].body, BlockBody::RichText("<p>Hello</p>".to_string()));

        let html = view.render().unwrap();
        assert!(!html.contains("style="));
    }
}
