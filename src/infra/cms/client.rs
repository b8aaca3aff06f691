use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::application::repos::{ContentRepo, RepoError};
use crate::config::CmsSettings;
use crate::domain::entities::{NewComment, Post, PostSummary, TagPosts, TagWithCount};
use crate::domain::types::CommentOrder;
use crate::infra::error::InfraError;
use crate::infra::telemetry::{CMS_FAILURE_TOTAL, CMS_REQUEST_TOTAL};

use super::queries;
use super::wire::{QueryResponse, WirePost, WireTagCount, WireTagPosts};

const USER_AGENT: &str = concat!("devscribe/", env!("CARGO_PKG_VERSION"));

/// Content repository backed by the Sanity HTTP API.
///
/// Listings go through the query endpoint (optionally via the API CDN). Post
/// lookups carry comments, so they always read from the live API to see a
/// comment right after it was written. Comment writes go through the mutate
/// endpoint on the live API with the write token.
/// Which host a query is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Freshness {
    /// CDN when `use_cdn` is set.
    Cached,
    /// Always the live API.
    Live,
}

#[derive(Clone)]
pub struct SanityRepo {
    http: Client,
    read_base: Url,
    write_base: Url,
    api_version: String,
    dataset: String,
    token: Option<String>,
}

impl SanityRepo {
    pub fn new(settings: &CmsSettings) -> Result<Self, InfraError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::cms(format!("failed to build http client: {err}")))?;

        let (read_base, write_base) = match &settings.api_base_url {
            Some(base) => {
                let base = with_trailing_slash(base.clone());
                (base.clone(), base)
            }
            None => (
                project_host(&settings.project_id, settings.use_cdn)?,
                project_host(&settings.project_id, false)?,
            ),
        };

        Ok(Self {
            http,
            read_base,
            write_base,
            api_version: settings.api_version.clone(),
            dataset: settings.dataset.clone(),
            token: settings.token.clone(),
        })
    }

    fn query_url(
        &self,
        freshness: Freshness,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<Url, RepoError> {
        let base = match freshness {
            Freshness::Cached => &self.read_base,
            Freshness::Live => &self.write_base,
        };
        let mut url = base
            .join(&format!("v{}/data/query/{}", self.api_version, self.dataset))
            .map_err(RepoError::from_transport)?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            for (name, value) in params {
                let encoded = serde_json::to_string(value).map_err(RepoError::from_decode)?;
                pairs.append_pair(&format!("${name}"), &encoded);
            }
        }

        Ok(url)
    }

    fn post_url(&self, slug: &str, comments: CommentOrder) -> Result<Url, RepoError> {
        self.query_url(
            Freshness::Live,
            &queries::post_by_slug(comments),
            &[(queries::SLUG_PARAM, slug)],
        )
    }

    fn mutate_url(&self) -> Result<Url, RepoError> {
        self.write_base
            .join(&format!("v{}/data/mutate/{}", self.api_version, self.dataset))
            .map_err(RepoError::from_transport)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: Result<Url, RepoError>,
    ) -> Result<Option<T>, RepoError> {
        counter!(CMS_REQUEST_TOTAL, "operation" => operation).increment(1);

        let result: Result<Option<T>, RepoError> = async {
            let url = url?;
            debug!(target: "devscribe::infra::cms", operation, "querying content backend");

            let response = self
                .authorize(self.http.get(url))
                .send()
                .await
                .map_err(map_send_error)?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(map_send_error)?;
            check_status(status)?;

            let body: QueryResponse<T> =
                serde_json::from_slice(&bytes).map_err(RepoError::from_decode)?;
            Ok(body.result)
        }
        .await;

        if let Err(err) = &result {
            record_failure(operation, err);
        }
        result
    }
}

#[async_trait]
impl ContentRepo for SanityRepo {
    async fn find_post(
        &self,
        slug: &str,
        comments: CommentOrder,
    ) -> Result<Option<Post>, RepoError> {
        let post: Option<WirePost> = self.fetch("find_post", self.post_url(slug, comments)).await?;
        Ok(post.map(|post| post.into_post(slug)))
    }

    async fn list_posts(&self) -> Result<Vec<PostSummary>, RepoError> {
        let url = self.query_url(Freshness::Cached, queries::LIST_POSTS, &[]);
        let posts: Option<Vec<WirePost>> = self.fetch("list_posts", url).await?;
        Ok(posts
            .unwrap_or_default()
            .into_iter()
            .filter_map(WirePost::into_summary)
            .collect())
    }

    async fn find_tag_with_posts(&self, slug: &str) -> Result<Option<TagPosts>, RepoError> {
        let url = self.query_url(
            Freshness::Cached,
            queries::TAG_WITH_POSTS,
            &[(queries::SLUG_PARAM, slug)],
        );
        let tag: Option<WireTagPosts> = self.fetch("find_tag_with_posts", url).await?;
        Ok(tag.and_then(WireTagPosts::into_tag_posts))
    }

    async fn list_tags(&self) -> Result<Vec<TagWithCount>, RepoError> {
        let url = self.query_url(Freshness::Cached, queries::LIST_TAGS, &[]);
        let tags: Option<Vec<WireTagCount>> = self.fetch("list_tags", url).await?;
        Ok(tags
            .unwrap_or_default()
            .into_iter()
            .filter_map(WireTagCount::into_tag_with_count)
            .collect())
    }

    async fn create_comment(&self, comment: NewComment) -> Result<(), RepoError> {
        const OPERATION: &str = "create_comment";
        counter!(CMS_REQUEST_TOTAL, "operation" => OPERATION).increment(1);

        let result: Result<(), RepoError> = async {
            if self.token.is_none() {
                return Err(RepoError::Unauthorized);
            }

            let body = json!({
                "mutations": [{
                    "create": {
                        "_type": "comment",
                        "name": comment.name,
                        "comment": comment.comment_text,
                        "post": { "_type": "reference", "_ref": comment.post_id },
                    }
                }]
            });

            let response = self
                .authorize(self.http.post(self.mutate_url()?))
                .json(&body)
                .send()
                .await
                .map_err(map_send_error)?;
            check_status(response.status())
        }
        .await;

        if let Err(err) = &result {
            record_failure(OPERATION, err);
        }
        result
    }
}

fn project_host(project_id: &str, use_cdn: bool) -> Result<Url, InfraError> {
    let host = if use_cdn { "apicdn" } else { "api" };
    Url::parse(&format!("https://{project_id}.{host}.sanity.io/"))
        .map_err(|err| InfraError::configuration(format!("invalid cms project id: {err}")))
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn check_status(status: StatusCode) -> Result<(), RepoError> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RepoError::Unauthorized),
        other => Err(RepoError::Upstream {
            status: other.as_u16(),
        }),
    }
}

fn map_send_error(err: reqwest::Error) -> RepoError {
    if err.is_timeout() {
        RepoError::Timeout
    } else {
        RepoError::from_transport(err)
    }
}

fn record_failure(operation: &'static str, err: &RepoError) {
    counter!(CMS_FAILURE_TOTAL, "operation" => operation).increment(1);
    warn!(
        target: "devscribe::infra::cms",
        operation,
        error = %err,
        "content backend request failed"
    );
}
