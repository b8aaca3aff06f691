use crate::domain::{blocks::HeadingRef, types::Theme};

pub const DEFAULT_IMAGE_ALT: &str = "Post Image";
pub const IMAGE_WIDTH: u32 = 700;
pub const IMAGE_HEIGHT: u32 = 400;
pub const ANCHOR_TARGET: &str = "_blank";
pub const ANCHOR_REL: &str = "noopener noreferrer";

/// UI node produced for one renderable block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiNode {
    Heading {
        level: u8,
        id: String,
        class: &'static str,
        children: Vec<InlineNode>,
    },
    Paragraph {
        class: &'static str,
        children: Vec<InlineNode>,
    },
    Image {
        src: String,
        alt: String,
        width: u32,
        height: u32,
        class: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineNode {
    Text(String),
    Strong(Vec<InlineNode>),
    Emphasis(Vec<InlineNode>),
    Code(Vec<InlineNode>),
    Underline(Vec<InlineNode>),
    StrikeThrough(Vec<InlineNode>),
    Anchor {
        href: String,
        target: &'static str,
        rel: &'static str,
        class: &'static str,
        children: Vec<InlineNode>,
    },
}

/// Presentation classes applied to rendered nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Typography {
    pub headings: [&'static str; 6],
    pub paragraph: &'static str,
    pub link: &'static str,
    pub image: &'static str,
}

impl Typography {
    pub fn for_theme(theme: Theme) -> Self {
        let link = match theme {
            Theme::Light => "text-blue-500 underline",
            Theme::Dark => "text-blue-400 underline",
        };
        Self {
            headings: [
                "text-4xl font-bold mt-6 mb-4",
                "text-3xl font-bold mt-6 mb-4",
                "text-2xl font-semibold mt-5 mb-3",
                "text-xl font-semibold mt-4 mb-2",
                "text-lg font-semibold mt-4 mb-2",
                "text-base font-semibold mt-4 mb-2",
            ],
            paragraph: "text-lg my-4",
            link,
            image: "rounded-md mx-auto",
        }
    }

    pub fn heading(&self, level: u8) -> &'static str {
        let index = usize::from(level.clamp(1, 6)) - 1;
        self.headings[index]
    }
}

/// Turns CMS asset references into public image URLs.
pub trait AssetUrlResolver: Send + Sync {
    /// `None` when the reference cannot be resolved; the image is then skipped.
    fn image_url(&self, asset_ref: &str) -> Option<String>;
}

impl<F> AssetUrlResolver for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn image_url(&self, asset_ref: &str) -> Option<String> {
        self(asset_ref)
    }
}

/// Per-request rendering inputs. Nothing here outlives the request.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub typography: Typography,
    pub images: &'a dyn AssetUrlResolver,
    pub theme: Theme,
}

impl<'a> RenderContext<'a> {
    pub fn new(theme: Theme, images: &'a dyn AssetUrlResolver) -> Self {
        Self {
            typography: Typography::for_theme(theme),
            images,
            theme,
        }
    }
}

impl std::fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("typography", &self.typography)
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}

/// Rendered post body alongside the outline derived from the same blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    pub nodes: Vec<UiNode>,
    /// Sanitised markup of `nodes`.
    pub html: String,
    pub toc: Vec<HeadingRef>,
}
