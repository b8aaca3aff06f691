use crate::application::error::{ErrorReport, HttpError};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let content = ErrorPageView::not_found();
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// Generic failure page for a backend that could not answer. The report from
/// the failing layer is kept for the response logger.
pub fn render_unavailable_response(chrome: LayoutChrome, error: HttpError) -> Response {
    let status = error.status();
    let content = ErrorPageView::unavailable(error.public_message());
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, status);
    error.into_report().attach(&mut response);
    response
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub accent: String,
    pub href: String,
}

#[derive(Clone)]
pub struct ThemeToggleView {
    pub current: String,
    pub next: String,
    pub label: String,
    pub href: String,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub theme: ThemeToggleView,
    pub footer: FooterView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn with_meta(self, meta: PageMetaView) -> Self {
        Self { meta, ..self }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub theme: ThemeToggleView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            theme: chrome.theme,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub og_title: String,
    pub og_description: String,
    pub og_type: &'static str,
    pub og_locale: &'static str,
    pub site_name: String,
    pub canonical: String,
}

impl PageMetaView {
    pub fn with_content(self, title: String, description: String) -> Self {
        Self {
            og_title: title.clone(),
            og_description: description.clone(),
            title,
            description,
            ..self
        }
    }

    pub fn as_article(self) -> Self {
        Self {
            og_type: "article",
            ..self
        }
    }
}

#[derive(Clone)]
pub struct TagBadge {
    pub slug: String,
    pub label: String,
}

#[derive(Clone)]
pub struct PostCard {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub iso_date: String,
    pub published: String,
    pub badges: Vec<TagBadge>,
}

pub struct IndexContext {
    pub heading: String,
    pub posts: Vec<PostCard>,
    pub has_results: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<IndexContext>,
}

pub struct TagPageContext {
    pub slug: String,
    pub name: String,
    pub heading: String,
    pub posts: Vec<PostCard>,
    pub has_results: bool,
}

#[derive(Template)]
#[template(path = "tag.html")]
pub struct TagTemplate {
    pub view: LayoutContext<TagPageContext>,
}

#[derive(Clone)]
pub struct TagSummary {
    pub label: String,
    pub path: String,
    pub count: u64,
}

pub struct TagListContext {
    pub tags: Vec<TagSummary>,
    pub has_results: bool,
}

#[derive(Template)]
#[template(path = "tags.html")]
pub struct TagsTemplate {
    pub view: LayoutContext<TagListContext>,
}

pub struct PostDetailContext {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub published: Option<String>,
    pub iso_date: Option<String>,
    pub tags: Vec<TagBadge>,
    /// Sanitised body markup.
    pub body_html: String,
    pub toc: Option<PostTocView>,
    pub comments: CommentSectionView,
}

#[derive(Clone)]
pub struct PostTocView {
    pub entries: Vec<TocEntryView>,
}

#[derive(Clone)]
pub struct TocEntryView {
    pub anchor: String,
    pub title: String,
    pub level: u8,
    pub indent_class: &'static str,
}

pub struct CommentSectionView {
    pub action: String,
    pub post_id: String,
    pub order: String,
    pub form: CommentFormView,
    pub list: CommentListView,
}

#[derive(Clone, Default)]
pub struct CommentFormView {
    pub name: String,
    pub comment: String,
    pub error: Option<String>,
    pub name_missing: bool,
    pub comment_missing: bool,
}

#[derive(Clone)]
pub struct CommentListView {
    pub entries: Vec<CommentView>,
    pub is_empty: bool,
    pub ascending_href: String,
    pub descending_href: String,
    pub is_ascending: bool,
}

#[derive(Clone)]
pub struct CommentView {
    pub name: String,
    pub text: String,
    pub posted: Option<String>,
    pub iso_date: Option<String>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostDetailContext>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage to continue exploring.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }

    pub fn unavailable(message: &str) -> Self {
        Self {
            title: "Something went wrong".to_string(),
            message: format!("{message}. Please reload the page in a moment."),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

pub fn build_tag_badges<'a, T>(tags: T) -> Vec<TagBadge>
where
    T: IntoIterator<Item = (&'a str, &'a str)>,
{
    tags.into_iter()
        .map(|(slug, name)| TagBadge {
            slug: slug.to_string(),
            label: format!("#{name}"),
        })
        .collect()
}

pub(crate) fn canonical_url(base: &str, path: &str) -> String {
    let root = base.trim_end_matches('/');
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        format!("{root}/")
    } else {
        format!("{root}/{trimmed}")
    }
}

pub(crate) fn fallback_description(candidate: &str, fallback: &str) -> String {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
