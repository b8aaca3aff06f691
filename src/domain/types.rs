//! Shared domain enumerations.

use serde::{Deserialize, Serialize};

/// Creation-time order for the comments fetched alongside a post.
///
/// Selected by the `comments` request parameter and threaded down to the CMS
/// query; the application never re-sorts comments itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentOrder {
    Ascending,
    #[default]
    Descending,
}

impl CommentOrder {
    /// Interpret the `comments` request parameter. Unknown or missing values
    /// fall back to newest-first.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(raw) if raw.eq_ignore_ascii_case("asc") => CommentOrder::Ascending,
            _ => CommentOrder::Descending,
        }
    }

    /// Value used in page URLs (`?comments=asc`).
    pub fn as_param(self) -> &'static str {
        match self {
            CommentOrder::Ascending => "asc",
            CommentOrder::Descending => "desc",
        }
    }

    /// Sort direction keyword for the CMS query language.
    pub fn query_direction(self) -> &'static str {
        match self {
            CommentOrder::Ascending => "asc",
            CommentOrder::Descending => "desc",
        }
    }

    pub fn is_ascending(self) -> bool {
        matches!(self, CommentOrder::Ascending)
    }
}

/// Cookie carrying the visitor's colour scheme.
pub const THEME_COOKIE: &str = "theme";

/// Colour scheme chosen by the reader, carried per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            raw if raw.eq_ignore_ascii_case("light") => Some(Theme::Light),
            raw if raw.eq_ignore_ascii_case("dark") => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}
