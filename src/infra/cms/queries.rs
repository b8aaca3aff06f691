//! GROQ documents sent to the query endpoint.
//!
//! User input never appears in the query text: the slug travels as the
//! `$slug` parameter and the comment order is picked from a closed enum.

use crate::domain::types::CommentOrder;

pub(crate) const SLUG_PARAM: &str = "slug";

pub(crate) const LIST_POSTS: &str = r#"*[_type == "post" && defined(slug.current)] | order(publishedAt desc) {
  _id,
  title,
  "slug": slug.current,
  publishedAt,
  excerpt,
  "tags": tags[]-> { _id, name, "slug": slug.current }
}"#;

pub(crate) const TAG_WITH_POSTS: &str = r#"*[_type == "tag" && slug.current == $slug][0] {
  _id,
  name,
  "slug": slug.current,
  "posts": *[_type == "post" && defined(slug.current) && references(^._id)] | order(publishedAt desc) {
    _id,
    title,
    "slug": slug.current,
    publishedAt,
    excerpt,
    "tags": tags[]-> { _id, name, "slug": slug.current }
  }
}"#;

pub(crate) const LIST_TAGS: &str = r#"*[_type == "tag" && defined(slug.current)] | order(name asc) {
  _id,
  name,
  "slug": slug.current,
  "postCount": count(*[_type == "post" && references(^._id)])
}"#;

/// Single post by slug with its comments sorted by creation time.
pub(crate) fn post_by_slug(order: CommentOrder) -> String {
    format!(
        r#"*[_type == "post" && slug.current == $slug][0] {{
  _id,
  title,
  "slug": slug.current,
  publishedAt,
  excerpt,
  body,
  "tags": tags[]-> {{ _id, name, "slug": slug.current }},
  "comments": *[_type == "comment" && post._ref == ^._id] | order(_createdAt {direction}) {{
    _id,
    name,
    comment,
    _createdAt
  }}
}}"#,
        direction = order.query_direction()
    )
}
