//! Repository trait describing the content backend.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{NewComment, Post, PostSummary, TagPosts, TagWithCount};
use crate::domain::types::CommentOrder;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("content backend unreachable: {0}")]
    Transport(String),
    #[error("content backend timed out")]
    Timeout,
    #[error("content backend responded with status {status}")]
    Upstream { status: u16 },
    #[error("content backend rejected credentials")]
    Unauthorized,
    #[error("content backend payload could not be decoded: {0}")]
    Decode(String),
}

impl RepoError {
    pub fn from_transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn from_decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Read and write access to posts, tags and comments.
///
/// Absence is reported as `Ok(None)`; `Err` is reserved for a backend that
/// could not answer.
#[async_trait]
pub trait ContentRepo: Send + Sync {
    async fn find_post(
        &self,
        slug: &str,
        comments: CommentOrder,
    ) -> Result<Option<Post>, RepoError>;

    /// Every post, newest first.
    async fn list_posts(&self) -> Result<Vec<PostSummary>, RepoError>;

    async fn find_tag_with_posts(&self, slug: &str) -> Result<Option<TagPosts>, RepoError>;

    /// Every tag with the number of posts referencing it, ordered by name.
    async fn list_tags(&self) -> Result<Vec<TagWithCount>, RepoError>;

    async fn create_comment(&self, comment: NewComment) -> Result<(), RepoError>;
}
