//! Page data loaders.
//!
//! Critical data is fetched concurrently and awaited before rendering; a
//! failure there becomes an [`AppError`]. Everything else degrades to
//! `None` with a warning. Below-the-fold data runs as a [`Deferred`] task
//! that the fragment endpoints resolve with a timeout.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use luneva_core::content::{Footer, Header, HomePage, Section, SectionSlot, Seo, Settings};
use tokio::task::JoinHandle;
use tracing::{instrument, warn};

use crate::error::AppError;
use crate::sections::SectionProducts;
use crate::shopify::{CollectionSummary, ProductSummary};
use crate::sources::{Catalog, ContentSource};

/// Upper bound on how long a fragment endpoint waits for deferred data.
pub const DEFERRED_TIMEOUT: Duration = Duration::from_secs(3);

/// Shell data every full page needs.
#[derive(Debug, Clone, Default)]
pub struct RootData {
    pub header: Option<Header>,
    pub settings: Option<Settings>,
}

/// Load the header and settings concurrently; failures become `None`.
#[instrument(skip(content))]
pub async fn load_root<S: ContentSource>(content: &S) -> RootData {
    let (header, settings) = tokio::join!(content.header(), content.settings());

    RootData {
        header: header.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load header");
            None
        }),
        settings: settings.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load settings");
            None
        }),
    }
}

/// Run a page's critical fetch alongside [`load_root`].
///
/// Pages render once both finish, so the shell costs no extra round trip.
pub async fn with_root<S, F>(content: &S, page: F) -> (F::Output, RootData)
where
    S: ContentSource,
    F: Future,
{
    tokio::join!(page, load_root(content))
}

/// Everything the home page renders above the fold.
#[derive(Debug, Clone, Default)]
pub struct HomeData {
    pub featured_collection: Option<CollectionSummary>,
    pub title: Option<String>,
    pub seo: Option<Seo>,
    pub sections: Vec<SectionSlot>,
    pub products: SectionProducts,
}

/// Load the home page.
///
/// The featured collection is critical. The home page document is not:
/// when it is missing or fails, the active video banner and hero are shown
/// instead. Bento grid product handles are then resolved concurrently; a
/// handle that fails or matches nothing is dropped.
///
/// # Errors
///
/// Returns an error if the featured collection query fails.
#[instrument(skip(catalog, content))]
pub async fn load_home<C: Catalog, S: ContentSource>(
    catalog: &C,
    content: &S,
) -> Result<HomeData, AppError> {
    let (featured, home_page) = tokio::join!(catalog.featured_collection(), content.home_page());

    let featured_collection = featured?;
    let home_page = home_page.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load home page");
        None
    });

    let (title, seo, sections) = match home_page {
        Some(HomePage {
            title,
            sections,
            seo,
            ..
        }) => (title, seo, sections),
        None => (None, None, fallback_sections(content).await),
    };

    let products = resolve_section_products(catalog, &sections).await;

    Ok(HomeData {
        featured_collection,
        title,
        seo,
        sections,
        products,
    })
}

async fn fallback_sections<S: ContentSource>(content: &S) -> Vec<SectionSlot> {
    let (banner, hero) = tokio::join!(content.active_video_banner(), content.active_hero());

    let banner = banner.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load active video banner");
        None
    });
    let hero = hero.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load active hero");
        None
    });

    banner
        .map(Section::VideoBanner)
        .into_iter()
        .chain(hero.map(Section::Hero))
        .map(SectionSlot::Known)
        .collect()
}

/// Fetch the products each bento grid references, keyed by section id.
///
/// Sections without handles get no entry.
pub async fn resolve_section_products<C: Catalog>(
    catalog: &C,
    sections: &[SectionSlot],
) -> SectionProducts {
    let lookups = sections
        .iter()
        .filter_map(SectionSlot::section)
        .filter_map(|section| match section {
            Section::BentoGrid(grid) => Some((grid.id.clone(), grid.product_handles())),
            _ => None,
        })
        .filter(|(_, handles)| !handles.is_empty())
        .map(|(section_id, handles)| async move {
            let cards = join_all(handles.iter().map(|handle| async move {
                match catalog.product_card(handle).await {
                    Ok(card) => card,
                    Err(e) => {
                        warn!(handle = %handle, error = %e, "Failed to fetch bento product");
                        None
                    }
                }
            }))
            .await;
            (section_id, cards.into_iter().flatten().collect::<Vec<_>>())
        });

    join_all(lookups).await.into_iter().collect()
}

/// A background task whose result is optional by construction.
pub struct Deferred<T> {
    handle: JoinHandle<Option<T>>,
}

impl<T: Send + 'static> Deferred<T> {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Option<T>> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    /// Wait up to `timeout`. A panic, a timeout, or an absent value all
    /// resolve to `None`; a timed-out task is aborted.
    pub async fn resolve(mut self, timeout: Duration) -> Option<T> {
        match tokio::time::timeout(timeout, &mut self.handle).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                warn!(error = %e, "Deferred task failed");
                None
            }
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis(), "Deferred task timed out");
                self.handle.abort();
                None
            }
        }
    }
}

/// Start loading the footer document.
pub fn defer_footer<S>(content: S) -> Deferred<Footer>
where
    S: ContentSource + 'static,
{
    Deferred::spawn(async move {
        content.footer().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load footer");
            None
        })
    })
}

/// Start loading recommended products.
pub fn defer_recommended<C>(catalog: C) -> Deferred<Vec<ProductSummary>>
where
    C: Catalog + 'static,
{
    Deferred::spawn(async move {
        match catalog.recommended_products().await {
            Ok(products) => Some(products),
            Err(e) => {
                warn!(error = %e, "Failed to load recommended products");
                None
            }
        }
    })
}
