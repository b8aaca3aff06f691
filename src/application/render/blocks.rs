use tracing::debug;

use crate::domain::blocks::{Block, ImageBlock, Span, TextBlock};

use super::types::{
    ANCHOR_REL, ANCHOR_TARGET, DEFAULT_IMAGE_ALT, IMAGE_HEIGHT, IMAGE_WIDTH, InlineNode,
    RenderContext, UiNode,
};

/// Map a post body to UI nodes, one per renderable block, in document order.
pub fn render_blocks(body: &[Block], ctx: &RenderContext<'_>) -> Vec<UiNode> {
    body.iter()
        .filter_map(|block| render_block(block, ctx))
        .collect()
}

fn render_block(block: &Block, ctx: &RenderContext<'_>) -> Option<UiNode> {
    match block {
        Block::Heading { content, .. } => {
            let heading = block.as_heading()?;
            Some(UiNode::Heading {
                level: heading.level,
                id: heading.anchor,
                class: ctx.typography.heading(heading.level),
                children: render_spans(content, ctx),
            })
        }
        Block::Paragraph(content) => Some(UiNode::Paragraph {
            class: ctx.typography.paragraph,
            children: render_spans(content, ctx),
        }),
        Block::Image(image) => render_image(image, ctx),
        Block::Unknown { kind } => {
            debug!(
                target: "devscribe::render",
                kind = kind.as_str(),
                "skipping block without a renderer"
            );
            None
        }
    }
}

fn render_image(image: &ImageBlock, ctx: &RenderContext<'_>) -> Option<UiNode> {
    let src = image
        .asset_ref
        .as_deref()
        .and_then(|asset_ref| ctx.images.image_url(asset_ref));
    let Some(src) = src else {
        debug!(
            target: "devscribe::render",
            asset_ref = image.asset_ref.as_deref().unwrap_or_default(),
            "skipping image with unresolvable asset"
        );
        return None;
    };

    Some(UiNode::Image {
        src,
        alt: image
            .alt
            .clone()
            .unwrap_or_else(|| DEFAULT_IMAGE_ALT.to_string()),
        width: IMAGE_WIDTH,
        height: IMAGE_HEIGHT,
        class: ctx.typography.image,
    })
}

type OpenLink<'a> = (&'a str, &'a str, Vec<InlineNode>);

/// Render spans in order. Consecutive spans carrying the same link annotation
/// share one anchor.
fn render_spans(content: &TextBlock, ctx: &RenderContext<'_>) -> Vec<InlineNode> {
    let mut nodes = Vec::with_capacity(content.children.len());
    let mut link: Option<OpenLink<'_>> = None;

    for span in &content.children {
        let decorated = decorate(span);
        match content.link_for(span) {
            Some((key, href)) => {
                let continues = matches!(&link, Some((open, _, _)) if *open == key);
                if !continues {
                    close_link(&mut link, &mut nodes, ctx);
                    link = Some((key, href, Vec::new()));
                }
                if let Some((_, _, children)) = link.as_mut() {
                    children.push(decorated);
                }
            }
            None => {
                close_link(&mut link, &mut nodes, ctx);
                nodes.push(decorated);
            }
        }
    }
    close_link(&mut link, &mut nodes, ctx);

    nodes
}

fn close_link(
    link: &mut Option<OpenLink<'_>>,
    nodes: &mut Vec<InlineNode>,
    ctx: &RenderContext<'_>,
) {
    if let Some((_, href, children)) = link.take() {
        nodes.push(InlineNode::Anchor {
            href: href.to_string(),
            target: ANCHOR_TARGET,
            rel: ANCHOR_REL,
            class: ctx.typography.link,
            children,
        });
    }
}

/// Wrap span text in its decorators; the first mark ends up outermost.
/// Annotation keys and unknown decorators leave the text unwrapped.
fn decorate(span: &Span) -> InlineNode {
    span.marks
        .iter()
        .rev()
        .fold(InlineNode::Text(span.text.clone()), |inner, mark| {
            match mark.as_str() {
                "strong" => InlineNode::Strong(vec![inner]),
                "em" => InlineNode::Emphasis(vec![inner]),
                "code" => InlineNode::Code(vec![inner]),
                "underline" => InlineNode::Underline(vec![inner]),
                "strike-through" => InlineNode::StrikeThrough(vec![inner]),
                _ => inner,
            }
        })
}
