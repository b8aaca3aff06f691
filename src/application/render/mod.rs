//! Post body rendering.
//!
//! The pipeline is pure and synchronous: decoded blocks are mapped to UI
//! nodes, serialised, and sanitised. The table of contents is derived from the
//! same blocks so heading ids and TOC links always agree.

mod blocks;
mod html;
mod sanitize;
mod toc;
mod types;

pub use blocks::render_blocks;
pub use html::to_html;
pub use sanitize::sanitize_html;
pub use toc::extract_headings;
pub use types::{
    ANCHOR_REL, ANCHOR_TARGET, AssetUrlResolver, DEFAULT_IMAGE_ALT, IMAGE_HEIGHT, IMAGE_WIDTH,
    InlineNode, RenderContext, RenderedBody, Typography, UiNode,
};

use crate::domain::blocks::Block;

/// Render a body and its outline in one pass over the same blocks.
pub fn render_body(body: &[Block], ctx: &RenderContext<'_>) -> RenderedBody {
    let nodes = render_blocks(body, ctx);
    let html = sanitize_html(&to_html(&nodes));
    let toc = extract_headings(body);
    RenderedBody { nodes, html, toc }
}
