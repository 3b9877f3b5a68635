//! Portable-text to HTML rendering.
//!
//! Output is escaped HTML meant to be embedded with `|safe`. Unknown block
//! types and styles degrade to nothing and to paragraphs respectively;
//! unknown marks are ignored.

use std::fmt::Write as _;

use luneva_core::content::{LinkResolver, PortableBlock, TextBlock};

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Number,
}

impl ListKind {
    fn of(block: &TextBlock) -> Option<Self> {
        match block.list_item.as_deref() {
            Some("bullet") => Some(Self::Bullet),
            Some("number") => Some(Self::Number),
            _ => None,
        }
    }

    const fn tag(self) -> &'static str {
        match self {
            Self::Bullet => "ul",
            Self::Number => "ol",
        }
    }
}

/// Render a block list to HTML.
#[must_use]
pub fn render(blocks: &[PortableBlock], links: &LinkResolver) -> String {
    let mut html = String::new();
    let mut open_list: Option<ListKind> = None;

    for block in blocks {
        let PortableBlock::Text(block) = block else {
            continue;
        };

        let list = ListKind::of(block);
        if open_list != list {
            if let Some(kind) = open_list {
                let _ = write!(html, "</{}>", kind.tag());
            }
            if let Some(kind) = list {
                let _ = write!(html, "<{}>", kind.tag());
            }
            open_list = list;
        }

        let tag = if list.is_some() {
            "li"
        } else {
            block_tag(block.style.as_deref())
        };
        let _ = write!(html, "<{tag}>");
        render_spans(block, links, &mut html);
        let _ = write!(html, "</{tag}>");
    }

    if let Some(kind) = open_list {
        let _ = write!(html, "</{}>", kind.tag());
    }
    html
}

fn block_tag(style: Option<&str>) -> &'static str {
    match style {
        Some("h1") => "h1",
        Some("h2") => "h2",
        Some("h3") => "h3",
        Some("h4") => "h4",
        Some("h5") => "h5",
        Some("h6") => "h6",
        Some("blockquote") => "blockquote",
        _ => "p",
    }
}

fn decorator_tag(mark: &str) -> Option<&'static str> {
    match mark {
        "strong" => Some("strong"),
        "em" => Some("em"),
        "code" => Some("code"),
        "underline" => Some("u"),
        "strike-through" => Some("s"),
        _ => None,
    }
}

fn render_spans(block: &TextBlock, links: &LinkResolver, html: &mut String) {
    for span in &block.children {
        let mut closing: Vec<&'static str> = Vec::new();

        for mark in &span.marks {
            if let Some(tag) = decorator_tag(mark) {
                let _ = write!(html, "<{tag}>");
                closing.push(tag);
            } else if let Some(def) = block.mark_def(mark)
                && def.kind == "link"
                && let Some(href) = def.href.as_deref()
            {
                let resolved = links.classify(href);
                html.push_str("<a href=\"");
                escape_into(&resolved.href, html);
                html.push('"');
                if resolved.external {
                    html.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
                }
                html.push('>');
                closing.push("a");
            }
        }

        escape_into(&span.text, html);

        for tag in closing.iter().rev() {
            let _ = write!(html, "</{tag}>");
        }
    }
}

/// Append `text` with askama's HTML escaping, safe in element content and
/// double-quoted attributes.
fn escape_into(text: &str, html: &mut String) {
    let Ok(escaped) = askama::filters::escape(text, askama::filters::Html);
    let _ = write!(html, "{escaped}");
}
