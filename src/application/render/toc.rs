use crate::domain::blocks::{Block, HeadingRef};

/// Heading outline of a post body in document order.
///
/// Anchors come from [`Block::as_heading`], the same accessor the body
/// renderer uses, so every entry links to an emitted heading id.
pub fn extract_headings(body: &[Block]) -> Vec<HeadingRef> {
    body.iter().filter_map(Block::as_heading).collect()
}
