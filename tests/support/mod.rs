//! Shared fixtures for HTTP-level tests: an in-memory content repository and
//! helpers for driving the router with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use devscribe::{
    application::{
        chrome::ChromeService,
        comments::CommentService,
        posts::PostService,
        render::AssetUrlResolver,
        repos::{ContentRepo, RepoError},
    },
    cache::CacheState,
    config::{CacheSettings, SiteSettings},
    domain::{
        blocks::Block,
        entities::{Comment, NewComment, Post, PostSummary, Tag, TagPosts, TagWithCount},
        types::CommentOrder,
    },
    infra::http::{HttpState, build_router},
};
use http_body_util::BodyExt;
use time::macros::datetime;
use tower::ServiceExt;

#[derive(Default)]
pub struct InMemoryRepo {
    pub posts: Vec<Post>,
    pub tags: Vec<Tag>,
    pub comments: Mutex<Vec<Comment>>,
    pub writes: Mutex<Vec<NewComment>>,
    pub requested_orders: Mutex<Vec<CommentOrder>>,
    pub post_reads: Mutex<usize>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl InMemoryRepo {
    pub fn seeded() -> Self {
        let rust = Tag {
            id: "tag-rust".to_string(),
            name: "Rust".to_string(),
            slug: "rust".to_string(),
        };
        let web = Tag {
            id: "tag-web".to_string(),
            name: "Web".to_string(),
            slug: "web".to_string(),
        };

        let hello = Post {
            id: "post-hello".to_string(),
            slug: "hello-world".to_string(),
            title: "Hello World".to_string(),
            excerpt: "First steps".to_string(),
            published_at: Some(datetime!(2024-01-01 09:00 UTC)),
            body: vec![
                Block::simple_heading(2, "Getting Started"),
                Block::simple_paragraph("Welcome to the blog."),
            ],
            tags: vec![rust.clone()],
            comments: Vec::new(),
        };
        let older = Post {
            id: "post-older".to_string(),
            slug: "older-news".to_string(),
            title: "Older News".to_string(),
            excerpt: String::new(),
            published_at: Some(datetime!(2023-06-15 12:00 UTC)),
            body: vec![Block::simple_paragraph("Nothing to see.")],
            tags: Vec::new(),
            comments: Vec::new(),
        };

        let comments = vec![
            Comment {
                id: "c1".to_string(),
                post_id: "post-hello".to_string(),
                name: "Ada".to_string(),
                comment_text: "First!".to_string(),
                created_at: Some(datetime!(2024-01-02 08:00 UTC)),
            },
            Comment {
                id: "c2".to_string(),
                post_id: "post-hello".to_string(),
                name: "Grace".to_string(),
                comment_text: "Second.".to_string(),
                created_at: Some(datetime!(2024-01-03 08:00 UTC)),
            },
        ];

        Self {
            posts: vec![hello, older],
            tags: vec![rust, web],
            comments: Mutex::new(comments),
            ..Default::default()
        }
    }

    fn read_guard(&self) -> Result<(), RepoError> {
        if self.fail_reads {
            Err(RepoError::Timeout)
        } else {
            Ok(())
        }
    }

    fn summary(post: &Post) -> PostSummary {
        PostSummary::from(post)
    }
}

#[async_trait]
impl ContentRepo for InMemoryRepo {
    async fn find_post(
        &self,
        slug: &str,
        comments: CommentOrder,
    ) -> Result<Option<Post>, RepoError> {
        self.read_guard()?;
        *self.post_reads.lock().expect("lock") += 1;
        self.requested_orders.lock().expect("lock").push(comments);

        let Some(post) = self.posts.iter().find(|post| post.slug == slug) else {
            return Ok(None);
        };

        let mut attached: Vec<Comment> = self
            .comments
            .lock()
            .expect("lock")
            .iter()
            .filter(|comment| comment.post_id == post.id)
            .cloned()
            .collect();
        attached.sort_by_key(|comment| comment.created_at);
        if !comments.is_ascending() {
            attached.reverse();
        }

        let mut post = post.clone();
        post.comments = attached;
        Ok(Some(post))
    }

    async fn list_posts(&self) -> Result<Vec<PostSummary>, RepoError> {
        self.read_guard()?;
        let mut posts: Vec<PostSummary> = self.posts.iter().map(Self::summary).collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(posts)
    }

    async fn find_tag_with_posts(&self, slug: &str) -> Result<Option<TagPosts>, RepoError> {
        self.read_guard()?;
        let Some(tag) = self.tags.iter().find(|tag| tag.slug == slug) else {
            return Ok(None);
        };
        let posts = self
            .posts
            .iter()
            .filter(|post| post.tags.iter().any(|t| t.id == tag.id))
            .map(Self::summary)
            .collect();
        Ok(Some(TagPosts {
            tag: tag.clone(),
            posts,
        }))
    }

    async fn list_tags(&self) -> Result<Vec<TagWithCount>, RepoError> {
        self.read_guard()?;
        Ok(self
            .tags
            .iter()
            .map(|tag| TagWithCount {
                tag: tag.clone(),
                post_count: self
                    .posts
                    .iter()
                    .filter(|post| post.tags.iter().any(|t| t.id == tag.id))
                    .count() as u64,
            })
            .collect())
    }

    async fn create_comment(&self, comment: NewComment) -> Result<(), RepoError> {
        if self.fail_writes {
            return Err(RepoError::Upstream { status: 500 });
        }
        let mut comments = self.comments.lock().expect("lock");
        let id = format!("c{}", comments.len() + 1);
        comments.push(Comment {
            id,
            post_id: comment.post_id.clone(),
            name: comment.name.clone(),
            comment_text: comment.comment_text.clone(),
            created_at: Some(datetime!(2024-02-01 00:00 UTC)),
        });
        self.writes.lock().expect("lock").push(comment);
        Ok(())
    }
}

fn test_images(asset_ref: &str) -> Option<String> {
    asset_ref
        .strip_prefix("image-")
        .map(|id| format!("https://cdn.test/{id}"))
}

pub fn site_settings() -> SiteSettings {
    SiteSettings {
        title: "Dev Scribe - A blog for developers".to_string(),
        description: "A blog for developers by developers!".to_string(),
        site_name: "DevScribe".to_string(),
        public_url: "https://blog.example.com".to_string(),
    }
}

pub fn build_state(repo: Arc<InMemoryRepo>, cache_enabled: bool) -> HttpState {
    let repo: Arc<dyn ContentRepo> = repo;
    let images: Arc<dyn AssetUrlResolver> = Arc::new(test_images as fn(&str) -> Option<String>);

    HttpState {
        posts: Arc::new(PostService::new(repo.clone(), images)),
        comments: Arc::new(CommentService::new(repo)),
        chrome: Arc::new(ChromeService::new(site_settings())),
        cache: CacheState::new(&CacheSettings {
            enabled: cache_enabled,
            revalidate: Duration::from_secs(60),
            max_entries: NonZeroUsize::new(32).expect("capacity"),
        }),
    }
}

pub fn router(repo: Arc<InMemoryRepo>) -> Router {
    build_router(build_state(repo, false))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub request_id: Option<String>,
    pub body: String,
}

impl TestResponse {
    async fn from_response(response: Response<Body>) -> Self {
        let status = response.status();
        let header_value = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let location = header_value(header::LOCATION);
        let set_cookie = header_value(header::SET_COOKIE);
        let request_id = header_value(header::HeaderName::from_static("x-request-id"));
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();

        Self {
            status,
            location,
            set_cookie,
            request_id,
            body: String::from_utf8(bytes.to_vec()).expect("utf8 body"),
        }
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    get_with_cookie(router, uri, None).await
}

pub async fn get_with_cookie(router: &Router, uri: &str, cookie: Option<&str>) -> TestResponse {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    let response = router
        .clone()
        .oneshot(request.body(Body::empty()).expect("request"))
        .await
        .expect("router response");
    TestResponse::from_response(response).await
}

pub async fn post_form(router: &Router, uri: &str, form: &[(&str, &str)]) -> TestResponse {
    let body: String = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form)
        .finish();
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("request");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router response");
    TestResponse::from_response(response).await
}
