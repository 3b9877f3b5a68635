//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::loader::{load_home, with_root};
use crate::middleware::CspNonce;
use crate::routes::layout::Shell;
use crate::sections::{RenderContext, RenderedSection, render_sections};
use crate::state::AppState;
use crate::views::CollectionCardView;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub shell: Shell,
    pub featured: Option<CollectionCardView>,
    /// Content sections in editor order.
    pub sections: Vec<RenderedSection>,
}

/// Display the home page.
///
/// Recommended products are below the fold and load through
/// `/fragments/recommended` after first paint.
#[instrument(skip(state, nonce))]
pub async fn home(State(state): State<AppState>, nonce: CspNonce) -> Result<HomeTemplate> {
    let (data, root) = with_root(
        state.sanity(),
        load_home(state.storefront(), state.sanity()),
    )
    .await;
    let data = data?;

    let ctx = RenderContext {
        links: state.links(),
    };
    let sections = render_sections(&data.sections, &data.products, &ctx);

    let seo = data.seo.as_ref();
    let shell = Shell::new(
        &state,
        nonce,
        &root,
        seo.and_then(|seo| seo.title.as_deref()),
        seo.and_then(|seo| seo.description.as_deref()),
        "/",
    );

    Ok(HomeTemplate {
        shell,
        featured: data.featured_collection.as_ref().map(CollectionCardView::from),
        sections,
    })
}
