//! Wire shapes returned by the query endpoint and their mapping onto domain records.
//!
//! Projections may leave any field `null`; decoding is lenient and the
//! mapping fills gaps with empty values rather than rejecting a document.

use serde::Deserialize;
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};
use tracing::warn;

use crate::domain::blocks::Block;
use crate::domain::entities::{Comment, Post, PostSummary, Tag, TagPosts, TagWithCount};

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse<T> {
    pub result: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireTag {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireTagCount {
    #[serde(flatten)]
    pub tag: WireTag,
    pub post_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireTagPosts {
    #[serde(flatten)]
    pub tag: WireTag,
    pub posts: Option<Vec<WirePost>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireComment {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<String>,
    pub comment: Option<String>,
    #[serde(rename = "_createdAt")]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePost {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub published_at: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<Vec<Block>>,
    /// Dangling references dereference to `null`.
    pub tags: Option<Vec<Option<WireTag>>>,
    pub comments: Option<Vec<WireComment>>,
}

impl WireTag {
    /// Tags without a slug cannot be linked and are dropped.
    pub(crate) fn into_tag(self) -> Option<Tag> {
        let slug = self.slug.filter(|slug| !slug.is_empty())?;
        Some(Tag {
            name: self.name.unwrap_or_else(|| slug.clone()),
            id: self.id,
            slug,
        })
    }
}

impl WireTagCount {
    pub(crate) fn into_tag_with_count(self) -> Option<TagWithCount> {
        Some(TagWithCount {
            tag: self.tag.into_tag()?,
            post_count: self.post_count.unwrap_or(0),
        })
    }
}

impl WireTagPosts {
    pub(crate) fn into_tag_posts(self) -> Option<TagPosts> {
        let posts = self
            .posts
            .unwrap_or_default()
            .into_iter()
            .filter_map(WirePost::into_summary)
            .collect();
        Some(TagPosts {
            tag: self.tag.into_tag()?,
            posts,
        })
    }
}

impl WirePost {
    pub(crate) fn into_summary(self) -> Option<PostSummary> {
        let slug = self.slug.filter(|slug| !slug.is_empty())?;
        Some(PostSummary {
            published_at: parse_timestamp(self.published_at.as_deref(), &self.id),
            tags: collect_tags(self.tags),
            title: self.title.unwrap_or_default(),
            excerpt: self.excerpt.unwrap_or_default(),
            id: self.id,
            slug,
        })
    }

    /// `requested_slug` stands in when the projection omitted the slug.
    pub(crate) fn into_post(self, requested_slug: &str) -> Post {
        let published_at = parse_timestamp(self.published_at.as_deref(), &self.id);
        let comments = self
            .comments
            .unwrap_or_default()
            .into_iter()
            .map(|comment| Comment {
                created_at: parse_timestamp(comment.created_at.as_deref(), &comment.id),
                id: comment.id,
                post_id: self.id.clone(),
                name: comment.name.unwrap_or_default(),
                comment_text: comment.comment.unwrap_or_default(),
            })
            .collect();

        Post {
            slug: self
                .slug
                .filter(|slug| !slug.is_empty())
                .unwrap_or_else(|| requested_slug.to_string()),
            title: self.title.unwrap_or_default(),
            excerpt: self.excerpt.unwrap_or_default(),
            published_at,
            body: self.body.unwrap_or_default(),
            tags: collect_tags(self.tags),
            comments,
            id: self.id,
        }
    }
}

fn collect_tags(tags: Option<Vec<Option<WireTag>>>) -> Vec<Tag> {
    tags.unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(WireTag::into_tag)
        .collect()
}

/// Accepts RFC 3339 datetimes and bare `YYYY-MM-DD` dates (midnight UTC).
pub(crate) fn parse_timestamp(raw: Option<&str>, document_id: &str) -> Option<OffsetDateTime> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    if let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
        return Some(date.midnight().assume_utc());
    }

    warn!(
        target: "devscribe::infra::cms",
        document_id,
        value = raw,
        "ignoring unparseable timestamp"
    );
    None
}
