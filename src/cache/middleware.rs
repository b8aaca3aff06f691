//! Response cache middleware.
//!
//! Serves fresh cached copies of public GET pages and stores successful
//! renders for the revalidation window.

use std::sync::Arc;

use axum::{
    body::{Body, HttpBody},
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use metrics::counter;
use tracing::{debug, instrument, warn};

use crate::config::CacheSettings;
use crate::domain::types::{THEME_COOKIE, Theme};
use crate::infra::telemetry::{
    CACHE_EVICT_TOTAL, CACHE_HIT_TOTAL, CACHE_INVALIDATE_TOTAL, CACHE_MISS_TOTAL,
};

use super::keys::ResponseKey;
use super::store::{CachedResponse, Lookup, ResponseStore};

const MAX_CACHED_BODY_BYTES: usize = 1024 * 1024;

/// Shared cache state for middleware and handlers.
#[derive(Clone)]
pub struct CacheState {
    enabled: bool,
    store: Arc<ResponseStore>,
}

impl CacheState {
    pub fn new(settings: &CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            store: Arc::new(ResponseStore::new(
                settings.max_entries,
                settings.revalidate,
            )),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn store(&self) -> &ResponseStore {
        &self.store
    }

    /// Drop every cached variant of `path`.
    pub fn invalidate_path(&self, path: &str) {
        let removed = self.store.invalidate_path(path);
        if removed > 0 {
            counter!(CACHE_INVALIDATE_TOTAL).increment(removed as u64);
        }
        debug!(target: "devscribe::cache", path, removed, "invalidated cached responses");
    }
}

/// Theme selected by the request's cookie, defaulting to light.
pub fn request_theme(jar: &CookieJar) -> Theme {
    jar.get(THEME_COOKIE)
        .and_then(|cookie| Theme::parse(cookie.value()))
        .unwrap_or_default()
}

/// Middleware for response caching.
///
/// Only GET requests that render `200 OK` with a body of known size up to
/// `MAX_CACHED_BODY_BYTES` are stored; anything else passes through untouched.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(cache): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !cache.enabled || request.method() != Method::GET {
        return next.run(request).await;
    }

    let theme = request_theme(&CookieJar::from_headers(request.headers()));
    let key = ResponseKey::from_uri(request.uri(), theme);

    match cache.store.lookup(&key) {
        Lookup::Hit(cached) => {
            counter!(CACHE_HIT_TOTAL).increment(1);
            debug!(target: "devscribe::cache", outcome = "hit", "serving cached response");
            return build_response(cached);
        }
        Lookup::Expired => {
            counter!(CACHE_MISS_TOTAL, "reason" => "expired").increment(1);
            debug!(target: "devscribe::cache", outcome = "expired", "revalidating response");
        }
        Lookup::Miss => {
            counter!(CACHE_MISS_TOTAL, "reason" => "absent").increment(1);
            debug!(target: "devscribe::cache", outcome = "miss", "cache miss, executing handler");
        }
    }

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let cacheable_size = response
        .body()
        .size_hint()
        .upper()
        .is_some_and(|upper| upper <= MAX_CACHED_BODY_BYTES as u64);
    if !cacheable_size {
        debug!(target: "devscribe::cache", outcome = "skipped", "response too large to cache");
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_CACHED_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(target: "devscribe::cache", error = %err, "failed to buffer response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let cached = CachedResponse {
        status: parts.status.as_u16(),
        headers: parts
            .headers
            .iter()
            .filter(|(name, _)| *name != axum::http::header::SET_COOKIE)
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect(),
        body: bytes.clone(),
    };

    if cache.store.insert(key, cached).is_some() {
        counter!(CACHE_EVICT_TOTAL).increment(1);
    }

    Response::from_parts(parts, Body::from(bytes))
}

fn build_response(cached: CachedResponse) -> Response {
    let mut builder = Response::builder().status(cached.status);

    for (name, value) in cached.headers {
        if let Ok(header_value) = HeaderValue::from_str(&value) {
            builder = builder.header(name, header_value);
        }
    }

    builder
        .body(Body::from(cached.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
