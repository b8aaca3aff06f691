use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::application::repos::{ContentRepo, RepoError};
use crate::domain::entities::{Comment, NewComment, format_post_date};
use crate::domain::error::DomainError;
use crate::domain::types::CommentOrder;
use crate::presentation::views::{CommentFormView, CommentListView, CommentView};

#[derive(Debug, Error)]
pub enum CommentError {
    #[error(transparent)]
    Validation(DomainError),
    #[error("failed to store comment")]
    Write(#[source] RepoError),
}

#[derive(Clone)]
pub struct CommentService {
    repo: Arc<dyn ContentRepo>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn ContentRepo>) -> Self {
        Self { repo }
    }

    /// Validate and store a comment. Nothing is written when validation fails.
    pub async fn submit(
        &self,
        post_id: &str,
        name: &str,
        comment_text: &str,
    ) -> Result<(), CommentError> {
        let comment =
            NewComment::new(post_id, name, comment_text).map_err(CommentError::Validation)?;
        let post_id = comment.post_id.clone();

        self.repo.create_comment(comment).await.map_err(|err| {
            warn!(
                target: "devscribe::comments",
                post_id = post_id.as_str(),
                error = %err,
                "comment write failed"
            );
            CommentError::Write(err)
        })?;

        info!(
            target: "devscribe::comments",
            post_id = post_id.as_str(),
            "comment stored"
        );
        Ok(())
    }

    /// Render comments exactly in the order received; sorting belongs to the fetch.
    pub fn list(comments: &[Comment], order: CommentOrder, post_path: &str) -> CommentListView {
        let entries: Vec<CommentView> = comments
            .iter()
            .map(|comment| CommentView {
                name: comment.name.clone(),
                text: comment.comment_text.clone(),
                posted: comment.created_at.map(format_post_date),
                iso_date: comment.created_at.and_then(|at| {
                    at.format(&time::format_description::well_known::Rfc3339)
                        .ok()
                }),
            })
            .collect();

        CommentListView {
            is_empty: entries.is_empty(),
            entries,
            ascending_href: order_href(post_path, CommentOrder::Ascending),
            descending_href: order_href(post_path, CommentOrder::Descending),
            is_ascending: order.is_ascending(),
        }
    }

    /// Form state for re-rendering after a rejected submission.
    pub fn form_after_error(name: &str, comment: &str, error: &CommentError) -> CommentFormView {
        let (message, missing) = match error {
            CommentError::Validation(err) => (
                format!("Please fill in: {}.", err.missing_fields().join(", ")),
                err.missing_fields(),
            ),
            CommentError::Write(_) => (
                "Your comment could not be saved. Please try again.".to_string(),
                &[][..],
            ),
        };

        CommentFormView {
            name: name.to_string(),
            comment: comment.to_string(),
            error: Some(message),
            name_missing: missing.contains(&"name"),
            comment_missing: missing.contains(&"comment"),
        }
    }
}

fn order_href(post_path: &str, order: CommentOrder) -> String {
    format!("{post_path}?comments={}#comments", order.as_param())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::macros::datetime;

    use crate::domain::entities::{Post, PostSummary, TagPosts, TagWithCount};

    use super::*;

    #[derive(Default)]
    struct RecordingRepo {
        writes: Mutex<Vec<NewComment>>,
        fail: bool,
    }

    #[async_trait]
    impl ContentRepo for RecordingRepo {
        async fn find_post(
            &self,
            _slug: &str,
            _comments: CommentOrder,
        ) -> Result<Option<Post>, RepoError> {
            Ok(None)
        }

        async fn list_posts(&self) -> Result<Vec<PostSummary>, RepoError> {
            Ok(Vec::new())
        }

        async fn find_tag_with_posts(&self, _slug: &str) -> Result<Option<TagPosts>, RepoError> {
            Ok(None)
        }

        async fn list_tags(&self) -> Result<Vec<TagWithCount>, RepoError> {
            Ok(Vec::new())
        }

        async fn create_comment(&self, comment: NewComment) -> Result<(), RepoError> {
            if self.fail {
                return Err(RepoError::Upstream { status: 500 });
            }
            self.writes.lock().expect("lock").push(comment);
            Ok(())
        }
    }

    #[tokio::test]
    async fn empty_name_is_rejected_without_a_write() {
        let repo = Arc::new(RecordingRepo::default());
        let service = CommentService::new(repo.clone());

        let err = service.submit("p1", "", "hi").await.expect_err("validation");

        match err {
            CommentError::Validation(err) => assert_eq!(err.missing_fields(), &["name"]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(repo.writes.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn valid_comment_is_written_trimmed() {
        let repo = Arc::new(RecordingRepo::default());
        let service = CommentService::new(repo.clone());

        service
            .submit("p1", " Ada ", " Great post ")
            .await
            .expect("stored");

        let writes = repo.writes.lock().expect("lock");
        assert_eq!(
            *writes,
            vec![NewComment {
                post_id: "p1".to_string(),
                name: "Ada".to_string(),
                comment_text: "Great post".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn backend_failure_is_a_write_error() {
        let repo = Arc::new(RecordingRepo {
            fail: true,
            ..Default::default()
        });
        let service = CommentService::new(repo);

        let err = service.submit("p1", "Ada", "hi").await.expect_err("write");
        assert!(matches!(err, CommentError::Write(RepoError::Upstream { status: 500 })));
    }

    #[test]
    fn empty_list_renders_nothing() {
        let view = CommentService::list(&[], CommentOrder::Ascending, "/posts/a");
        assert!(view.entries.is_empty());
        assert!(view.is_empty);
        assert!(view.is_ascending);
        assert_eq!(view.ascending_href, "/posts/a?comments=asc#comments");
        assert_eq!(view.descending_href, "/posts/a?comments=desc#comments");
    }

    #[test]
    fn list_keeps_fetch_order() {
        let comments = vec![
            Comment {
                id: "c2".to_string(),
                post_id: "p1".to_string(),
                name: "Grace".to_string(),
                comment_text: "second".to_string(),
                created_at: Some(datetime!(2024-02-02 10:00 UTC)),
            },
            Comment {
                id: "c1".to_string(),
                post_id: "p1".to_string(),
                name: "Ada".to_string(),
                comment_text: "first".to_string(),
                created_at: None,
            },
        ];

        let view = CommentService::list(&comments, CommentOrder::Descending, "/posts/a");
        let names: Vec<&str> = view.entries.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Grace", "Ada"]);
        assert_eq!(view.entries[0].posted.as_deref(), Some("Fri Feb 02 2024"));
        assert!(view.entries[1].posted.is_none());
    }

    #[test]
    fn error_form_preserves_input() {
        let error = CommentError::Validation(DomainError::missing(vec!["comment"]));
        let form = CommentService::form_after_error("Ada", "  ", &error);
        assert_eq!(form.name, "Ada");
        assert_eq!(form.comment, "  ");
        assert!(form.comment_missing);
        assert!(!form.name_missing);
        assert_eq!(form.error.as_deref(), Some("Please fill in: comment."));
    }
}
