use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, Level, debug, info_span};
use uuid::Uuid;

use crate::application::error::ErrorReport;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_INCOMING_ID_LEN: usize = 64;

/// Assigns a request id (reusing a sane incoming `x-request-id`), echoes it on
/// the response and runs the rest of the stack inside a span carrying it.
pub async fn set_request_context(request: Request<Body>, next: Next) -> Response {
    let id = incoming_request_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());
    let span = info_span!("request", request_id = id.as_str());
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let acceptable = !raw.is_empty()
        && raw.len() <= MAX_INCOMING_ID_LEN
        && raw.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    acceptable.then(|| raw.to_string())
}

macro_rules! log_failure {
    ($level:expr, $message:literal, $($field:tt)+) => {
        tracing::event!(target: "devscribe::http::response", $level, $($field)+, $message)
    };
}

/// Logs failed requests with the `ErrorReport` attached by the failing layer.
/// Successful requests only show up at debug level.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if !(status.is_client_error() || status.is_server_error()) {
        debug!(
            target: "devscribe::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            elapsed_ms,
            "request served"
        );
        return response;
    }

    let report = response.extensions_mut().remove::<ErrorReport>();
    let (source, messages) = match report {
        Some(report) => (report.source, report.messages),
        None => ("unknown", Vec::new()),
    };
    let detail = messages.first().map(String::as_str).unwrap_or("no diagnostic available");

    if status.is_server_error() {
        log_failure!(
            Level::ERROR,
            "request failed",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            query = uri.query().unwrap_or(""),
            elapsed_ms,
            source,
            detail,
            chain = ?messages
        );
    } else {
        log_failure!(
            Level::WARN,
            "client request error",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            query = uri.query().unwrap_or(""),
            elapsed_ms,
            source,
            detail,
            chain = ?messages
        );
    }

    response
}
