use std::fmt::Write as _;

use super::types::{InlineNode, UiNode};

/// Serialise UI nodes to markup, one block element per line.
pub fn to_html(nodes: &[UiNode]) -> String {
    let mut html = String::new();
    for node in nodes {
        write_node(&mut html, node);
        html.push('\n');
    }
    html
}

fn write_node(out: &mut String, node: &UiNode) {
    match node {
        UiNode::Heading {
            level,
            id,
            class,
            children,
        } => {
            let _ = write!(
                out,
                "<h{level} id=\"{}\" class=\"{}\">",
                escape_attribute(id),
                escape_attribute(class)
            );
            write_inline(out, children);
            let _ = write!(out, "</h{level}>");
        }
        UiNode::Paragraph { class, children } => {
            let _ = write!(out, "<p class=\"{}\">", escape_attribute(class));
            write_inline(out, children);
            out.push_str("</p>");
        }
        UiNode::Image {
            src,
            alt,
            width,
            height,
            class,
        } => {
            let _ = write!(
                out,
                "<img src=\"{}\" alt=\"{}\" width=\"{width}\" height=\"{height}\" class=\"{}\">",
                escape_attribute(src),
                escape_attribute(alt),
                escape_attribute(class)
            );
        }
    }
}

fn write_inline(out: &mut String, nodes: &[InlineNode]) {
    for node in nodes {
        match node {
            InlineNode::Text(text) => out.push_str(&escape_text(text)),
            InlineNode::Strong(children) => wrap(out, "strong", children),
            InlineNode::Emphasis(children) => wrap(out, "em", children),
            InlineNode::Code(children) => wrap(out, "code", children),
            InlineNode::Underline(children) => wrap(out, "u", children),
            InlineNode::StrikeThrough(children) => wrap(out, "s", children),
            InlineNode::Anchor {
                href,
                target,
                rel,
                class,
                children,
            } => {
                let _ = write!(
                    out,
                    "<a href=\"{}\" class=\"{}\" target=\"{}\" rel=\"{}\">",
                    escape_attribute(href),
                    escape_attribute(class),
                    escape_attribute(target),
                    escape_attribute(rel)
                );
                write_inline(out, children);
                out.push_str("</a>");
            }
        }
    }
}

fn wrap(out: &mut String, tag: &str, children: &[InlineNode]) {
    let _ = write!(out, "<{tag}>");
    write_inline(out, children);
    let _ = write!(out, "</{tag}>");
}

fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\n' | '\r' | '\t' => escaped.push(' '),
            _ => escaped.push(ch),
        }
    }
    escaped
}
