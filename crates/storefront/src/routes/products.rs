//! Product detail route handler.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::loader::with_root;
use crate::middleware::CspNonce;
use crate::routes::layout::Shell;
use crate::shopify::{Product, ProductVariant, SelectedOption};
use crate::state::AppState;
use crate::views::{ImageView, product_url};

/// One selectable value of a product option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionValueView {
    pub value: String,
    /// Product URL that selects this value, keeping the other selections.
    pub url: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub name: String,
    pub values: Vec<OptionValueView>,
}

/// Product detail display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    pub handle: String,
    pub title: String,
    pub vendor: String,
    pub description_html: String,
    pub images: Vec<ImageView>,
    /// Options with more than one value; single-variant products have none.
    pub options: Vec<OptionView>,
    /// Selected variant id, `None` when the product has no variants.
    pub variant_id: Option<String>,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub available: bool,
}

impl ProductView {
    /// Build the view for the variant selected by `query`, falling back to
    /// the default variant when nothing matches.
    #[must_use]
    pub fn build(product: &Product, query: &HashMap<String, String>) -> Self {
        let variant = selected_variant(product, query).or_else(|| product.default_variant());
        let selection = variant.map_or(&[][..], |variant| variant.selected_options.as_slice());

        let mut images: Vec<ImageView> = Vec::with_capacity(product.images.len() + 1);
        if let Some(image) = variant.and_then(|variant| variant.image.as_ref()) {
            images.push(ImageView::from_shopify(image, &product.title));
        }
        for image in &product.images {
            if images.iter().all(|existing| existing.url != image.url) {
                images.push(ImageView::from_shopify(image, &product.title));
            }
        }

        let options = product
            .options
            .iter()
            .filter(|option| option.values.len() > 1)
            .map(|option| OptionView {
                name: option.name.clone(),
                values: option
                    .values
                    .iter()
                    .map(|value| OptionValueView {
                        value: value.clone(),
                        url: product_url(
                            &product.handle,
                            &with_option(selection, &option.name, value),
                        ),
                        selected: selection
                            .iter()
                            .any(|selected| selected.name == option.name && &selected.value == value),
                    })
                    .collect(),
            })
            .collect();

        let price = variant.map_or_else(
            || product.price_range.min_variant_price.clone(),
            |variant| variant.price.clone(),
        );

        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            vendor: product.vendor.clone(),
            description_html: product.description_html.clone(),
            images,
            options,
            variant_id: variant.map(|variant| variant.id.to_string()),
            compare_at_price: variant
                .and_then(|variant| variant.compare_at_price.as_ref())
                .filter(|compare_at| compare_at.amount > price.amount)
                .map(luneva_core::Price::display),
            price: price.display(),
            available: variant.is_some_and(|variant| variant.available_for_sale),
        }
    }
}

/// The variant whose options all match the query string.
fn selected_variant<'a>(
    product: &'a Product,
    query: &HashMap<String, String>,
) -> Option<&'a ProductVariant> {
    if query.is_empty() {
        return None;
    }
    product.variants.iter().find(|variant| {
        variant
            .selected_options
            .iter()
            .all(|option| query.get(&option.name) == Some(&option.value))
    })
}

/// `selection` with `name` switched to `value`.
fn with_option(selection: &[SelectedOption], name: &str, value: &str) -> Vec<SelectedOption> {
    let mut options: Vec<SelectedOption> = selection.to_vec();
    match options.iter_mut().find(|option| option.name == name) {
        Some(option) => option.value = value.to_string(),
        None => options.push(SelectedOption {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
    options
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub shell: Shell,
    pub product: ProductView,
}

/// Display a product. Option values in the query string select a variant.
#[instrument(skip(state, nonce, query), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    nonce: CspNonce,
    Path(handle): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<ProductShowTemplate> {
    let (product, root) =
        with_root(state.sanity(), state.storefront().get_product_by_handle(&handle)).await;
    let product = product?;
    if product.variants.is_empty() {
        return Err(AppError::NotFound(format!("product without variants: {handle}")));
    }

    let shell = Shell::new(
        &state,
        nonce,
        &root,
        Some(product.seo.title.as_deref().unwrap_or(&product.title)),
        product
            .seo
            .description
            .as_deref()
            .or(Some(product.description.as_str())),
        &format!("/products/{handle}"),
    );

    Ok(ProductShowTemplate {
        shell,
        product: ProductView::build(&product, &query),
    })
}
