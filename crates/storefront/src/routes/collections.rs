//! Collection route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;
use url::form_urlencoded;

use crate::error::Result;
use crate::filters;
use crate::loader::with_root;
use crate::middleware::CspNonce;
use crate::routes::layout::Shell;
use crate::shopify::{CollectionSortKey, PageInfo, ProductSortKey};
use crate::state::AppState;
use crate::views::{CollectionCardView, ProductCardView};

/// Products per page on collection pages.
const PRODUCTS_PER_PAGE: i64 = 24;

/// Collections shown on the listing page.
const COLLECTIONS_LIMIT: i64 = 50;

/// Cursor pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub after: Option<String>,
}

/// Collection listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/index.html")]
pub struct CollectionsIndexTemplate {
    pub shell: Shell,
    pub collections: Vec<CollectionCardView>,
}

/// Collection detail page template, also used for `/collections/all`.
#[derive(Template, WebTemplate)]
#[template(path = "collections/show.html")]
pub struct CollectionShowTemplate {
    pub shell: Shell,
    pub title: String,
    pub description_html: String,
    pub products: Vec<ProductCardView>,
    /// Link to the next page, if any.
    pub next_url: Option<String>,
}

fn next_url(path: &str, page_info: &PageInfo) -> Option<String> {
    if !page_info.has_next_page {
        return None;
    }
    let cursor = page_info.end_cursor.as_deref()?;
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("after", cursor)
        .finish();
    Some(format!("{path}?{query}"))
}

/// Display the collection listing page.
#[instrument(skip(state, nonce))]
pub async fn index(
    State(state): State<AppState>,
    nonce: CspNonce,
) -> Result<CollectionsIndexTemplate> {
    let (connection, root) = with_root(
        state.sanity(),
        state
            .storefront()
            .get_collections(COLLECTIONS_LIMIT, None, CollectionSortKey::Title, false),
    )
    .await;
    let connection = connection?;
    let shell = Shell::new(&state, nonce, &root, Some("Collections"), None, "/collections");

    Ok(CollectionsIndexTemplate {
        shell,
        collections: connection
            .collections
            .iter()
            .map(CollectionCardView::from)
            .collect(),
    })
}

/// Display every product, best sellers first.
#[instrument(skip(state, nonce))]
pub async fn all(
    State(state): State<AppState>,
    nonce: CspNonce,
    Query(query): Query<PageQuery>,
) -> Result<CollectionShowTemplate> {
    let (connection, root) = with_root(
        state.sanity(),
        state
            .storefront()
            .get_products(PRODUCTS_PER_PAGE, query.after, ProductSortKey::BestSelling, false),
    )
    .await;
    let connection = connection?;
    let shell = Shell::new(
        &state,
        nonce,
        &root,
        Some("All products"),
        None,
        "/collections/all",
    );

    Ok(CollectionShowTemplate {
        shell,
        title: "All products".to_string(),
        description_html: String::new(),
        products: connection.products.iter().map(ProductCardView::from).collect(),
        next_url: next_url("/collections/all", &connection.page_info),
    })
}

/// Display a collection with one page of its products.
///
/// An unknown handle is a 404.
#[instrument(skip(state, nonce, query), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    nonce: CspNonce,
    Path(handle): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<CollectionShowTemplate> {
    let (collection, root) = with_root(
        state.sanity(),
        state
            .storefront()
            .get_collection_by_handle(&handle, PRODUCTS_PER_PAGE, query.after),
    )
    .await;
    let collection = collection?;

    let path = format!("/collections/{handle}");
    let title = collection
        .seo
        .title
        .clone()
        .unwrap_or_else(|| collection.title.clone());
    let shell = Shell::new(
        &state,
        nonce,
        &root,
        Some(&title),
        collection
            .seo
            .description
            .as_deref()
            .or(Some(collection.description.as_str())),
        &path,
    );

    Ok(CollectionShowTemplate {
        shell,
        title: collection.title.clone(),
        description_html: collection.description_html.clone(),
        products: collection
            .products
            .products
            .iter()
            .map(ProductCardView::from)
            .collect(),
        next_url: next_url(&path, &collection.products.page_info),
    })
}
