use std::sync::Arc;

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::warn;

use crate::{
    application::{
        chrome::ChromeService,
        comments::{CommentError, CommentService},
        error::{ErrorReport, HttpError},
        posts::{PostService, post_path},
    },
    cache::{CacheState, request_theme, response_cache_layer},
    domain::types::{CommentOrder, THEME_COOKIE, Theme},
    presentation::views::{
        IndexTemplate, LayoutChrome, LayoutContext, PostDetailContext, PostTemplate, TagTemplate,
        TagsTemplate, fallback_description, render_not_found_response, render_template_response,
        render_unavailable_response,
    },
};

use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub chrome: Arc<ChromeService>,
    pub cache: CacheState,
}

pub fn build_router(state: HttpState) -> Router {
    let cached_routes = Router::new()
        .route("/", get(index))
        .route("/posts/{slug}", get(post_detail))
        .route("/tag", get(tag_list))
        .route("/tag/{slug}", get(tag_detail))
        .layer(middleware::from_fn_with_state(
            state.cache.clone(),
            response_cache_layer,
        ));

    let uncached_routes = Router::new()
        .route("/posts/{slug}/comments", post(submit_comment))
        .route("/theme/{mode}", get(switch_theme))
        .route("/_health", get(health));

    cached_routes
        .merge(uncached_routes)
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostQuery {
    comments: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CommentForm {
    post_id: String,
    name: String,
    comment: String,
    order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThemeQuery {
    next: Option<String>,
}

fn request_path(uri: &Uri) -> &str {
    uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/")
}

async fn index(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let chrome = state.chrome.load(request_theme(&jar), "/");

    match state.posts.index().await {
        Ok(content) => {
            let view = LayoutContext::new(chrome, content);
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => render_unavailable_response(chrome, HttpError::from(err)),
    }
}

async fn post_detail(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<PostQuery>,
    jar: CookieJar,
    uri: Uri,
) -> Response {
    let theme = request_theme(&jar);
    let order = CommentOrder::from_param(query.comments.as_deref());
    let chrome = state.chrome.load(theme, request_path(&uri));

    match state.posts.post_detail(&slug, order, theme).await {
        Ok(Some(content)) => render_post(&state, chrome, content, StatusCode::OK),
        Ok(None) => render_not_found_response(chrome),
        Err(err) => render_unavailable_response(chrome, HttpError::from(err)),
    }
}

fn render_post(
    state: &HttpState,
    chrome: LayoutChrome,
    content: PostDetailContext,
    status: StatusCode,
) -> Response {
    let description = fallback_description(&content.excerpt, &state.chrome.site().description);
    let meta = chrome
        .meta
        .clone()
        .with_content(content.title.clone(), description)
        .as_article();
    let view = LayoutContext::new(chrome.with_meta(meta), content);
    render_template_response(PostTemplate { view }, status)
}

async fn submit_comment(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    jar: CookieJar,
    Form(form): Form<CommentForm>,
) -> Response {
    let order = CommentOrder::from_param(form.order.as_deref());
    let path = post_path(&slug);
    let theme = request_theme(&jar);
    let chrome = state.chrome.load(theme, &path);

    let post_id = match state.posts.post_id(&slug).await {
        Ok(Some(id)) => id,
        Ok(None) => return render_not_found_response(chrome),
        Err(err) => return render_unavailable_response(chrome, HttpError::from(err)),
    };
    if form.post_id.trim() != post_id {
        warn!(
            target: "devscribe::http::comments",
            slug = slug.as_str(),
            form_post_id = form.post_id.as_str(),
            post_id = post_id.as_str(),
            "comment form names a different post; writing to the post behind the slug"
        );
    }

    let error = match state.comments.submit(&post_id, &form.name, &form.comment).await {
        Ok(()) => {
            state.cache.invalidate_path(&path);
            let target = format!("{path}?comments={}#comments", order.as_param());
            return Redirect::to(&target).into_response();
        }
        Err(err) => err,
    };

    let status = match &error {
        CommentError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CommentError::Write(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let report = ErrorReport::from_error("infra::http::submit_comment", status, &error);

    let mut response = match state.posts.post_detail(&slug, order, theme).await {
        Ok(Some(mut content)) => {
            content.comments.form =
                CommentService::form_after_error(&form.name, &form.comment, &error);
            render_post(&state, chrome, content, status)
        }
        Ok(None) => return render_not_found_response(chrome),
        Err(err) => return render_unavailable_response(chrome, HttpError::from(err)),
    };

    report.attach(&mut response);
    response
}

async fn tag_detail(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    jar: CookieJar,
) -> Response {
    let chrome = state
        .chrome
        .load(request_theme(&jar), &format!("/tag/{slug}"));

    match state.posts.tag_page(&slug).await {
        Ok(Some(content)) => {
            let meta = chrome.meta.clone().with_content(
                format!("#{slug}"),
                format!("Posts with the tag {slug}"),
            );
            let view = LayoutContext::new(chrome.with_meta(meta), content);
            render_template_response(TagTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => render_unavailable_response(chrome, HttpError::from(err)),
    }
}

async fn tag_list(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let chrome = state.chrome.load(request_theme(&jar), "/tag");

    match state.posts.tags().await {
        Ok(content) => {
            let view = LayoutContext::new(chrome, content);
            render_template_response(TagsTemplate { view }, StatusCode::OK)
        }
        Err(err) => render_unavailable_response(chrome, HttpError::from(err)),
    }
}

async fn switch_theme(
    State(state): State<HttpState>,
    Path(mode): Path<String>,
    Query(query): Query<ThemeQuery>,
    jar: CookieJar,
) -> Response {
    let Some(theme) = Theme::parse(&mode) else {
        return render_not_found_response(state.chrome.load(request_theme(&jar), "/"));
    };

    let cookie = Cookie::build((THEME_COOKIE, theme.as_str()))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(true)
        .permanent();
    let target = safe_return_path(query.next.as_deref());

    (jar.add(cookie), Redirect::to(target)).into_response()
}

/// Only same-site absolute paths are followed; anything else returns home.
fn safe_return_path(next: Option<&str>) -> &str {
    match next {
        Some(path) if is_local_path(path) => path,
        _ => "/",
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn fallback(State(state): State<HttpState>, jar: CookieJar, uri: Uri) -> Response {
    render_not_found_response(state.chrome.load(request_theme(&jar), uri.path()))
}
