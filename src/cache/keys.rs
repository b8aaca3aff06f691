//! Response cache keys.

use axum::http::Uri;

use crate::domain::types::Theme;

/// Identifies one rendered variant of a page.
///
/// The theme is part of the key because it changes the markup of the body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseKey {
    pub path: String,
    pub query: String,
    pub theme: Theme,
}

impl ResponseKey {
    pub fn new(path: impl Into<String>, query: impl Into<String>, theme: Theme) -> Self {
        Self {
            path: path.into(),
            query: query.into(),
            theme,
        }
    }

    pub fn from_uri(uri: &Uri, theme: Theme) -> Self {
        Self::new(uri.path(), uri.query().unwrap_or(""), theme)
    }
}
