use serde::Serialize;

/// A Prismic rich-text block with no inline formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub text: String,
    pub spans: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Heading1,
    Paragraph,
}

impl RichTextBlock {
    pub fn heading1(text: &str) -> Self {
        Self {
            kind: BlockKind::Heading1,
            text: text.to_string(),
            spans: Vec::new(),
        }
    }

    pub fn paragraph(text: &str) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: text.to_string(),
            spans: Vec::new(),
        }
    }
}

/// One paragraph per non-empty trimmed line.
pub fn paragraphs(text: &str) -> Vec<RichTextBlock> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(RichTextBlock::paragraph)
        .collect()
}
