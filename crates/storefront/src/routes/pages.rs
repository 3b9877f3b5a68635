//! Content pages backed by singleton documents.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use luneva_core::content::{About, Faq};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::loader::with_root;
use crate::middleware::CspNonce;
use crate::portable_text;
use crate::routes::layout::Shell;
use crate::state::AppState;
use crate::views::{CONTENT_IMAGE_WIDTH, ImageView};

#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub shell: Shell,
    pub title: String,
    pub image: Option<ImageView>,
    pub body_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqEntryView {
    pub question: String,
    pub answer_html: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/faq.html")]
pub struct FaqTemplate {
    pub shell: Shell,
    pub title: String,
    pub entries: Vec<FaqEntryView>,
}

/// About page. 404 until the document exists.
#[instrument(skip(state, nonce))]
pub async fn about(State(state): State<AppState>, nonce: CspNonce) -> Result<AboutTemplate> {
    let (about, root) = with_root(state.sanity(), state.sanity().get_about()).await;
    let about = about?.ok_or_else(|| AppError::NotFound("about".to_string()))?;

    let About {
        title,
        main_image,
        content,
        ..
    } = about;
    let title = title.unwrap_or_else(|| "About".to_string());
    let shell = Shell::new(&state, nonce, &root, Some(&title), None, "/pages/about");

    Ok(AboutTemplate {
        image: main_image
            .as_ref()
            .and_then(|image| ImageView::from_content(image, &title, CONTENT_IMAGE_WIDTH)),
        body_html: portable_text::render(&content, state.links()),
        title,
        shell,
    })
}

/// FAQ page. Entries without a question are left out.
#[instrument(skip(state, nonce))]
pub async fn faq(State(state): State<AppState>, nonce: CspNonce) -> Result<FaqTemplate> {
    let (faq, root) = with_root(state.sanity(), state.sanity().get_faq()).await;
    let Faq { title, faqs, .. } = faq?.ok_or_else(|| AppError::NotFound("faq".to_string()))?;

    let title = title.unwrap_or_else(|| "Frequently asked questions".to_string());
    let entries = faqs
        .iter()
        .filter_map(|entry| {
            let question = entry.question.as_deref()?.trim();
            (!question.is_empty()).then(|| FaqEntryView {
                question: question.to_string(),
                answer_html: portable_text::render(&entry.answer, state.links()),
            })
        })
        .collect();
    let shell = Shell::new(&state, nonce, &root, Some(&title), None, "/pages/faq");

    Ok(FaqTemplate {
        shell,
        title,
        entries,
    })
}
