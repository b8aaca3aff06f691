//! Read-only snapshots of CMS records, as handed to a single render pass.

use time::{OffsetDateTime, macros::format_description};

use crate::domain::{blocks::Block, error::DomainError};

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub published_at: Option<OffsetDateTime>,
    pub body: Vec<Block>,
    pub tags: Vec<Tag>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub published_at: Option<OffsetDateTime>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagWithCount {
    pub tag: Tag,
    pub post_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagPosts {
    pub tag: Tag,
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub name: String,
    pub comment_text: String,
    pub created_at: Option<OffsetDateTime>,
}

/// A validated comment submission ready for the CMS write path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub post_id: String,
    pub name: String,
    pub comment_text: String,
}

impl NewComment {
    /// Trims every field and rejects blank ones, naming each missing field.
    pub fn new(post_id: &str, name: &str, comment_text: &str) -> Result<Self, DomainError> {
        let post_id = post_id.trim();
        let name = name.trim();
        let comment_text = comment_text.trim();

        let mut missing = Vec::new();
        if post_id.is_empty() {
            missing.push("post_id");
        }
        if name.is_empty() {
            missing.push("name");
        }
        if comment_text.is_empty() {
            missing.push("comment");
        }
        if !missing.is_empty() {
            return Err(DomainError::missing(missing));
        }

        Ok(Self {
            post_id: post_id.to_string(),
            name: name.to_string(),
            comment_text: comment_text.to_string(),
        })
    }
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            slug: post.slug.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            published_at: post.published_at,
            tags: post.tags.clone(),
        }
    }
}

/// Formats a publication date as `Mon Jan 01 2024`.
pub fn format_post_date(value: OffsetDateTime) -> String {
    let format = format_description!("[weekday repr:short] [month repr:short] [day] [year]");
    value.format(&format).unwrap_or_default()
}
