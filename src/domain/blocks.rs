//! Post bodies as a closed set of block kinds.
//!
//! The CMS stores rich text as Portable Text: an array of loosely typed JSON
//! objects. Each element is decoded into [`Block`]; anything the renderer does
//! not know how to draw becomes [`Block::Unknown`] instead of a decoding error,
//! so content authored with newer block styles still loads.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::slug::heading_anchor;

pub const MAX_HEADING_LEVEL: u8 = 6;

const BLOCK_TYPE: &str = "block";
const IMAGE_TYPE: &str = "image";
const SPAN_TYPE: &str = "span";
const LINK_TYPE: &str = "link";
const NORMAL_STYLE: &str = "normal";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum Block {
    Heading { level: u8, content: TextBlock },
    Paragraph(TextBlock),
    Image(ImageBlock),
    /// A block type or style with no renderer. Carries the source kind for logging.
    Unknown { kind: String },
}

/// Text-bearing block: ordered spans plus the annotation definitions they reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBlock {
    pub children: Vec<Span>,
    pub mark_defs: Vec<MarkDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    /// Decorator names (`strong`, `em`, …) or keys into the block's `mark_defs`.
    pub marks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkDef {
    Link { key: String, href: String },
    Other { key: String, kind: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlock {
    pub asset_ref: Option<String>,
    pub alt: Option<String>,
}

/// Heading view shared by the body renderer and the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRef {
    pub level: u8,
    pub text: String,
    pub anchor: String,
}

impl Block {
    pub fn simple_heading(level: u8, text: &str) -> Self {
        Block::Heading {
            level: level.clamp(1, MAX_HEADING_LEVEL),
            content: TextBlock::plain(text),
        }
    }

    pub fn simple_paragraph(text: &str) -> Self {
        Block::Paragraph(TextBlock::plain(text))
    }

    /// Heading level, display text and anchor id, or `None` for non-heading blocks.
    pub fn as_heading(&self) -> Option<HeadingRef> {
        match self {
            Block::Heading { level, content } => Some(HeadingRef {
                level: *level,
                text: content.plain_text(),
                anchor: heading_anchor(content.first_child_text()),
            }),
            _ => None,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Block::Heading { .. } | Block::Paragraph(_) => BLOCK_TYPE,
            Block::Image(_) => IMAGE_TYPE,
            Block::Unknown { kind } => kind.as_str(),
        }
    }
}

impl TextBlock {
    pub fn plain(text: &str) -> Self {
        Self {
            children: vec![Span::plain(text)],
            mark_defs: Vec::new(),
        }
    }

    /// Literal text of the first child span; empty when the block has no spans.
    pub fn first_child_text(&self) -> &str {
        self.children
            .first()
            .map(|span| span.text.as_str())
            .unwrap_or("")
    }

    pub fn plain_text(&self) -> String {
        self.children.iter().map(|span| span.text.as_str()).collect()
    }

    /// Resolve the link annotation applied to `span`, if any.
    pub fn link_for<'a>(&'a self, span: &'a Span) -> Option<(&'a str, &'a str)> {
        span.marks.iter().find_map(|mark| {
            self.mark_defs.iter().find_map(|def| match def {
                MarkDef::Link { key, href } if key == mark => Some((key.as_str(), href.as_str())),
                _ => None,
            })
        })
    }
}

impl Span {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            marks: Vec::new(),
        }
    }

    pub fn marked(text: &str, marks: &[&str]) -> Self {
        Self {
            text: text.to_string(),
            marks: marks.iter().map(|mark| mark.to_string()).collect(),
        }
    }
}

impl From<Value> for Block {
    fn from(value: Value) -> Self {
        match serde_json::from_value::<RawBlock>(value) {
            Ok(raw) => Block::from(raw),
            Err(_) => Block::Unknown {
                kind: "malformed".to_string(),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBlock {
    #[serde(rename = "_type")]
    kind: Option<String>,
    style: Option<String>,
    children: Option<Vec<RawChild>>,
    #[serde(rename = "markDefs")]
    mark_defs: Option<Vec<RawMarkDef>>,
    asset: Option<RawAsset>,
    alt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawChild {
    #[serde(rename = "_type")]
    kind: Option<String>,
    text: Option<String>,
    marks: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMarkDef {
    #[serde(rename = "_key")]
    key: Option<String>,
    #[serde(rename = "_type")]
    kind: Option<String>,
    href: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAsset {
    #[serde(rename = "_ref")]
    reference: Option<String>,
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        let kind = raw.kind.unwrap_or_default();
        match kind.as_str() {
            BLOCK_TYPE => {
                let content = TextBlock {
                    children: raw
                        .children
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(RawChild::into_span)
                        .collect(),
                    mark_defs: raw
                        .mark_defs
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(RawMarkDef::into_mark_def)
                        .collect(),
                };
                let style = raw.style.unwrap_or_else(|| NORMAL_STYLE.to_string());
                if style == NORMAL_STYLE {
                    Block::Paragraph(content)
                } else if let Some(level) = heading_level(&style) {
                    Block::Heading { level, content }
                } else {
                    Block::Unknown {
                        kind: format!("{BLOCK_TYPE}:{style}"),
                    }
                }
            }
            IMAGE_TYPE => Block::Image(ImageBlock {
                asset_ref: raw.asset.and_then(|asset| asset.reference),
                alt: raw.alt.filter(|alt| !alt.trim().is_empty()),
            }),
            _ => Block::Unknown { kind },
        }
    }
}

impl RawChild {
    fn into_span(self) -> Option<Span> {
        match self.kind.as_deref() {
            Some(SPAN_TYPE) | None => Some(Span {
                text: self.text?,
                marks: self.marks.unwrap_or_default(),
            }),
            // inline objects have no text to render
            Some(_) => None,
        }
    }
}

impl RawMarkDef {
    fn into_mark_def(self) -> Option<MarkDef> {
        let key = self.key?;
        let kind = self.kind.unwrap_or_default();
        match (kind.as_str(), self.href) {
            (LINK_TYPE, Some(href)) => Some(MarkDef::Link { key, href }),
            _ => Some(MarkDef::Other { key, kind }),
        }
    }
}

fn heading_level(style: &str) -> Option<u8> {
    let level: u8 = style.strip_prefix('h')?.parse().ok()?;
    (1..=MAX_HEADING_LEVEL).contains(&level).then_some(level)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode(value: Value) -> Vec<Block> {
        serde_json::from_value(value).expect("body decodes")
    }

    #[test]
    fn decodes_headings_and_paragraphs() {
        let body = decode(json!([
            {
                "_type": "block",
                "_key": "a1",
                "style": "h2",
                "children": [{ "_type": "span", "text": "Getting Started", "marks": [] }],
                "markDefs": []
            },
            {
                "_type": "block",
                "style": "normal",
                "children": [{ "_type": "span", "text": "Intro text." }]
            }
        ]));

        assert_eq!(
            body,
            vec![
                Block::simple_heading(2, "Getting Started"),
                Block::simple_paragraph("Intro text."),
            ]
        );
    }

    #[test]
    fn missing_style_is_a_paragraph() {
        let body = decode(json!([{ "_type": "block", "children": [{ "text": "plain" }] }]));
        assert_eq!(body, vec![Block::simple_paragraph("plain")]);
    }

    #[test]
    fn unsupported_styles_and_types_become_unknown() {
        let body = decode(json!([
            { "_type": "block", "style": "blockquote", "children": [] },
            { "_type": "block", "style": "h7", "children": [] },
            { "_type": "codeBlock", "code": "fn main() {}" },
            "not even an object",
            { "children": null }
        ]));

        let kinds: Vec<&str> = body.iter().map(Block::kind).collect();
        assert_eq!(
            kinds,
            vec!["block:blockquote", "block:h7", "codeBlock", "malformed", ""]
        );
    }

    #[test]
    fn decodes_images_and_drops_blank_alt() {
        let body = decode(json!([
            { "_type": "image", "asset": { "_ref": "image-abc-700x400-png" }, "alt": "Diagram" },
            { "_type": "image", "asset": { "_ref": "image-def-10x10-jpg" }, "alt": "   " }
        ]));

        assert_eq!(
            body,
            vec![
                Block::Image(ImageBlock {
                    asset_ref: Some("image-abc-700x400-png".to_string()),
                    alt: Some("Diagram".to_string()),
                }),
                Block::Image(ImageBlock {
                    asset_ref: Some("image-def-10x10-jpg".to_string()),
                    alt: None,
                }),
            ]
        );
    }

    #[test]
    fn heading_anchor_uses_first_child_only() {
        let body = decode(json!([{
            "_type": "block",
            "style": "h3",
            "children": [
                { "_type": "span", "text": "Install", "marks": ["strong"] },
                { "_type": "span", "text": " the toolchain" }
            ]
        }]));

        let heading = body[0].as_heading().expect("heading");
        assert_eq!(heading.level, 3);
        assert_eq!(heading.text, "Install the toolchain");
        assert_eq!(heading.anchor, "install");
    }

    #[test]
    fn link_marks_resolve_through_mark_defs() {
        let body = decode(json!([{
            "_type": "block",
            "style": "normal",
            "markDefs": [
                { "_key": "k1", "_type": "link", "href": "https://www.rust-lang.org" },
                { "_key": "k2", "_type": "internalLink" }
            ],
            "children": [
                { "_type": "span", "text": "Rust", "marks": ["k1", "em"] },
                { "_type": "span", "text": " rocks", "marks": ["k2"] },
                { "_type": "inlineWidget", "id": 4 }
            ]
        }]));

        let Block::Paragraph(content) = &body[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(content.children.len(), 2);
        assert_eq!(
            content.link_for(&content.children[0]),
            Some(("k1", "https://www.rust-lang.org"))
        );
        assert_eq!(content.link_for(&content.children[1]), None);
    }

    #[test]
    fn empty_heading_has_empty_anchor() {
        let block = Block::Heading {
            level: 2,
            content: TextBlock::default(),
        };
        let heading = block.as_heading().expect("heading");
        assert_eq!(heading.anchor, "");
        assert_eq!(heading.text, "");
    }
}
