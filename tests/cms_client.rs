//! Exercises the Sanity adapter against a local stand-in for the HTTP API.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use devscribe::{
    application::repos::{ContentRepo, RepoError},
    config::CmsSettings,
    domain::{blocks::Block, entities::NewComment, types::CommentOrder},
    infra::cms::SanityRepo,
};
use serde_json::{Value, json};
use url::Url;

#[derive(Clone, Default)]
struct Recorded {
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    mutations: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    mutate_status: Arc<Mutex<Option<StatusCode>>>,
}

async fn query(
    State(recorded): State<Recorded>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let groq = params.get("query").cloned().unwrap_or_default();
    let slug = params.get("$slug").cloned();
    recorded.queries.lock().expect("lock").push(params);

    if groq.contains("\"post\" && slug.current == $slug") {
        if slug.as_deref() != Some("\"hello-world\"") {
            return (StatusCode::OK, Json(json!({ "result": null })));
        }
        return (
            StatusCode::OK,
            Json(json!({
                "result": {
                    "_id": "post-1",
                    "title": "Hello World",
                    "slug": "hello-world",
                    "publishedAt": "2024-01-01T00:00:00Z",
                    "excerpt": "Intro",
                    "body": [
                        {"_type": "block", "style": "h2", "children": [{"_type": "span", "text": "Setup"}]},
                        {"_type": "image", "asset": {"_ref": "image-abc-10x10-png"}}
                    ],
                    "tags": [{"_id": "t1", "name": "Rust", "slug": "rust"}],
                    "comments": [
                        {"_id": "c1", "name": "Ada", "comment": "Hi", "_createdAt": "2024-01-02T00:00:00Z"}
                    ]
                }
            })),
        );
    }

    if groq.contains("\"postCount\"") {
        return (
            StatusCode::OK,
            Json(json!({ "result": [
                {"_id": "t1", "name": "Rust", "slug": "rust", "postCount": 3},
                {"_id": "t2", "name": "Orphan", "slug": null, "postCount": 1}
            ]})),
        );
    }

    if groq.contains("\"tag\" && slug.current == $slug") {
        return (StatusCode::OK, Json(json!({ "result": null })));
    }

    (StatusCode::BAD_GATEWAY, Json(json!({ "error": "unexpected query" })))
}

async fn mutate(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    recorded.mutations.lock().expect("lock").push((auth, body));

    let status = recorded
        .mutate_status
        .lock()
        .expect("lock")
        .unwrap_or(StatusCode::OK);
    (status, Json(json!({ "transactionId": "tx-1", "results": [] })))
}

async fn spawn_backend() -> (SocketAddr, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/v2024-01-01/data/query/production", get(query))
        .route("/v2024-01-01/data/mutate/production", post(mutate))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (addr, recorded)
}

fn settings(addr: SocketAddr, token: Option<&str>) -> CmsSettings {
    CmsSettings {
        project_id: "abc123".to_string(),
        dataset: "production".to_string(),
        api_version: "2024-01-01".to_string(),
        use_cdn: true,
        token: token.map(str::to_string),
        timeout: Duration::from_secs(5),
        api_base_url: Some(Url::parse(&format!("http://{addr}/")).expect("url")),
    }
}

#[tokio::test]
async fn find_post_sends_parameterised_query_and_decodes_result() {
    let (addr, recorded) = spawn_backend().await;
    let repo = SanityRepo::new(&settings(addr, None)).expect("repo");

    let post = repo
        .find_post("hello-world", CommentOrder::Ascending)
        .await
        .expect("query")
        .expect("post");

    assert_eq!(post.title, "Hello World");
    assert_eq!(post.tags[0].slug, "rust");
    assert_eq!(post.comments[0].name, "Ada");
    assert!(matches!(post.body[0], Block::Heading { level: 2, .. }));
    assert!(matches!(
        &post.body[1],
        Block::Image(image) if image.asset_ref.as_deref() == Some("image-abc-10x10-png")
    ));

    let queries = recorded.queries.lock().expect("lock");
    let groq = &queries[0]["query"];
    assert!(groq.contains("order(_createdAt asc)"));
    assert!(!groq.contains("hello-world"));
    assert_eq!(queries[0]["$slug"], "\"hello-world\"");
}

#[tokio::test]
async fn missing_post_is_none() {
    let (addr, _) = spawn_backend().await;
    let repo = SanityRepo::new(&settings(addr, None)).expect("repo");

    let post = repo
        .find_post("nope", CommentOrder::Descending)
        .await
        .expect("query");
    assert!(post.is_none());

    let tag = repo.find_tag_with_posts("nope").await.expect("query");
    assert!(tag.is_none());
}

#[tokio::test]
async fn list_tags_skips_unlinkable_entries() {
    let (addr, _) = spawn_backend().await;
    let repo = SanityRepo::new(&settings(addr, None)).expect("repo");

    let tags = repo.list_tags().await.expect("tags");
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].tag.name, "Rust");
    assert_eq!(tags[0].post_count, 3);
}

#[tokio::test]
async fn upstream_errors_are_reported() {
    let (addr, _) = spawn_backend().await;
    let repo = SanityRepo::new(&settings(addr, None)).expect("repo");

    // The stand-in answers unrecognised queries with 502.
    let err = repo.list_posts().await.expect_err("upstream failure");
    assert!(matches!(err, RepoError::Upstream { status: 502 }));
}

#[tokio::test]
async fn create_comment_posts_a_reference_mutation_with_the_token() {
    let (addr, recorded) = spawn_backend().await;
    let repo = SanityRepo::new(&settings(addr, Some("secret"))).expect("repo");

    let comment = NewComment::new("post-1", "Ada", "Nice read").expect("comment");
    repo.create_comment(comment).await.expect("write");

    let mutations = recorded.mutations.lock().expect("lock");
    let (auth, body) = &mutations[0];
    assert_eq!(auth.as_deref(), Some("Bearer secret"));
    assert_eq!(
        body["mutations"][0]["create"],
        json!({
            "_type": "comment",
            "name": "Ada",
            "comment": "Nice read",
            "post": { "_type": "reference", "_ref": "post-1" }
        })
    );
}

#[tokio::test]
async fn rejected_credentials_are_unauthorized() {
    let (addr, recorded) = spawn_backend().await;
    *recorded.mutate_status.lock().expect("lock") = Some(StatusCode::FORBIDDEN);
    let repo = SanityRepo::new(&settings(addr, Some("stale"))).expect("repo");

    let comment = NewComment::new("post-1", "Ada", "Hi").expect("comment");
    let err = repo.create_comment(comment).await.expect_err("forbidden");
    assert!(matches!(err, RepoError::Unauthorized));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let repo = SanityRepo::new(&settings(addr, None)).expect("repo");
    let err = repo.list_tags().await.expect_err("no backend");
    assert!(matches!(err, RepoError::Transport(_)));
}
