use std::sync::Arc;

use thiserror::Error;
use time::format_description::well_known::Rfc3339;

use crate::application::comments::CommentService;
use crate::application::render::{AssetUrlResolver, RenderContext, render_body};
use crate::application::repos::{ContentRepo, RepoError};
use crate::domain::blocks::HeadingRef;
use crate::domain::entities::{Post, PostSummary, format_post_date};
use crate::domain::types::{CommentOrder, Theme};
use crate::presentation::views::{
    CommentFormView, CommentSectionView, IndexContext, PostCard, PostDetailContext, PostTocView,
    TagListContext, TagPageContext, TagSummary, TocEntryView, build_tag_badges,
};

#[derive(Debug, Error)]
pub enum PostError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Read side of the blog: listings, tag pages and post detail.
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn ContentRepo>,
    images: Arc<dyn AssetUrlResolver>,
}

impl PostService {
    pub fn new(repo: Arc<dyn ContentRepo>, images: Arc<dyn AssetUrlResolver>) -> Self {
        Self { repo, images }
    }

    pub async fn index(&self) -> Result<IndexContext, PostError> {
        let posts = self.repo.list_posts().await?;
        let posts: Vec<PostCard> = posts.iter().map(build_post_card).collect();

        Ok(IndexContext {
            heading: "Latest posts".to_string(),
            has_results: !posts.is_empty(),
            posts,
        })
    }

    /// Post detail with comments fetched in `order`. `Ok(None)` when no post has `slug`.
    pub async fn post_detail(
        &self,
        slug: &str,
        order: CommentOrder,
        theme: Theme,
    ) -> Result<Option<PostDetailContext>, PostError> {
        let Some(post) = self.repo.find_post(slug, order).await? else {
            return Ok(None);
        };

        Ok(Some(self.build_post_context(post, order, theme)))
    }

    /// Id of the post published under `slug`, used to target comment writes.
    pub async fn post_id(&self, slug: &str) -> Result<Option<String>, PostError> {
        let post = self.repo.find_post(slug, CommentOrder::default()).await?;
        Ok(post.map(|post| post.id))
    }

    fn build_post_context(
        &self,
        post: Post,
        order: CommentOrder,
        theme: Theme,
    ) -> PostDetailContext {
        let ctx = RenderContext::new(theme, &*self.images);
        let rendered = render_body(&post.body, &ctx);
        let path = post_path(&post.slug);

        PostDetailContext {
            comments: CommentSectionView {
                action: format!("{path}/comments"),
                post_id: post.id.clone(),
                order: order.as_param().to_string(),
                form: CommentFormView::default(),
                list: CommentService::list(&post.comments, order, &path),
            },
            published: post.published_at.map(format_post_date),
            iso_date: post
                .published_at
                .and_then(|at| at.format(&Rfc3339).ok()),
            tags: build_tag_badges(
                post.tags
                    .iter()
                    .map(|tag| (tag.slug.as_str(), tag.name.as_str())),
            ),
            toc: build_post_toc_view(&rendered.toc),
            body_html: rendered.html,
            id: post.id,
            slug: post.slug,
            title: post.title,
            excerpt: post.excerpt,
        }
    }

    /// Posts referencing the tag. `Ok(None)` when the tag does not exist.
    pub async fn tag_page(&self, slug: &str) -> Result<Option<TagPageContext>, PostError> {
        let Some(found) = self.repo.find_tag_with_posts(slug).await? else {
            return Ok(None);
        };

        let posts: Vec<PostCard> = found.posts.iter().map(build_post_card).collect();
        Ok(Some(TagPageContext {
            heading: format!("#{}", found.tag.name),
            slug: found.tag.slug,
            name: found.tag.name,
            has_results: !posts.is_empty(),
            posts,
        }))
    }

    pub async fn tags(&self) -> Result<TagListContext, PostError> {
        let tags = self.repo.list_tags().await?;
        let tags: Vec<TagSummary> = tags
            .into_iter()
            .map(|entry| TagSummary {
                path: format!("/tag/{}", entry.tag.slug),
                label: format!("#{}", entry.tag.name),
                count: entry.post_count,
            })
            .collect();

        Ok(TagListContext {
            has_results: !tags.is_empty(),
            tags,
        })
    }
}

pub fn post_path(slug: &str) -> String {
    format!("/posts/{slug}")
}

fn build_post_card(post: &PostSummary) -> PostCard {
    PostCard {
        slug: post.slug.clone(),
        title: post.title.clone(),
        excerpt: post.excerpt.clone(),
        iso_date: post
            .published_at
            .and_then(|at| at.format(&Rfc3339).ok())
            .unwrap_or_default(),
        published: post
            .published_at
            .map(format_post_date)
            .unwrap_or_default(),
        badges: build_tag_badges(
            post.tags
                .iter()
                .map(|tag| (tag.slug.as_str(), tag.name.as_str())),
        ),
    }
}

fn build_post_toc_view(headings: &[HeadingRef]) -> Option<PostTocView> {
    if headings.is_empty() {
        return None;
    }

    let entries = headings
        .iter()
        .map(|heading| TocEntryView {
            anchor: heading.anchor.clone(),
            title: heading.text.clone(),
            level: heading.level,
            indent_class: toc_indent_class(heading.level),
        })
        .collect();

    Some(PostTocView { entries })
}

fn toc_indent_class(level: u8) -> &'static str {
    match level {
        0 | 1 => "ml-0",
        2 => "ml-2",
        3 => "ml-4",
        4 => "ml-6",
        5 => "ml-8",
        _ => "ml-10",
    }
}
