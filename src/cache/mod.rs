//! Time-bounded response cache.
//!
//! Rendered public pages are kept in an LRU keyed by path, query and theme,
//! and reused until the revalidation window elapses. Comment writes drop the
//! entries of the affected post.

mod keys;
mod lock;
mod middleware;
mod store;

pub use keys::ResponseKey;
pub use middleware::{CacheState, request_theme, response_cache_layer};
pub use store::{CachedResponse, Lookup, ResponseStore};
