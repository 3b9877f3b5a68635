//! Portable-text rich text data model.

use serde::{Deserialize, Serialize};

/// One block of rich text. Block types other than `block` (embedded
/// images, custom objects) are kept as [`PortableBlock::Unsupported`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum PortableBlock {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    /// `normal`, `h1`..`h6`, `blockquote`.
    #[serde(default)]
    pub style: Option<String>,
    /// `bullet` or `number` when the block is a list item.
    #[serde(default)]
    pub list_item: Option<String>,
    #[serde(default)]
    pub level: Option<u8>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub children: Vec<Span>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub mark_defs: Vec<MarkDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub text: String,
    /// Decorator names (`strong`, `em`, ...) or keys into `mark_defs`.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub marks: Vec<String>,
}

/// An annotation referenced from a span's marks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type", default)]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

impl TextBlock {
    /// Concatenated span text.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.children.iter().map(|span| span.text.as_str()).collect()
    }

    /// Look up an annotation by key.
    #[must_use]
    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|def| def.key == key)
    }
}

/// Plain-text rendition of a block list, blocks separated by blank lines.
#[must_use]
pub fn plain_text(blocks: &[PortableBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            PortableBlock::Text(text) => Some(text.plain_text()),
            PortableBlock::Unsupported => None,
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_block_with_marks() {
        let json = r#"[
            {"_type":"block","_key":"a","style":"normal","markDefs":[{"_key":"l1","_type":"link","href":"https://x.test"}],
             "children":[{"_type":"span","text":"Hello ","marks":[]},{"_type":"span","text":"world","marks":["strong","l1"]}]},
            {"_type":"image","asset":{"_ref":"image-1"}}
        ]"#;
        let blocks: Vec<PortableBlock> = serde_json::from_str(json).unwrap();
        assert_eq!(blocks.len(), 2);
        let PortableBlock::Text(block) = &blocks[0] else {
            panic!("expected text block");
        };
        assert_eq!(block.plain_text(), "Hello world");
        assert_eq!(block.mark_def("l1").unwrap().href.as_deref(), Some("https://x.test"));
        assert_eq!(blocks[1], PortableBlock::Unsupported);
    }

    #[test]
    fn test_plain_text_joins_blocks() {
        let json = r#"[
            {"_type":"block","children":[{"text":"One"}]},
            {"_type":"block","children":null},
            {"_type":"block","children":[{"text":"Two"}]}
        ]"#;
        let blocks: Vec<PortableBlock> = serde_json::from_str(json).unwrap();
        assert_eq!(plain_text(&blocks), "One\n\nTwo");
    }
}
