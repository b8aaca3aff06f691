//! Application services layer.

pub mod chrome;
pub mod comments;
pub mod error;
pub mod posts;
pub mod render;
pub mod repos;
