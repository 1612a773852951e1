//! Request logging middleware.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, info_span, warn, Span};

const IMAGE_PATH_PREFIX: &str = "/api/v1/images/";

/// Request path with any image key replaced by `:key`.
///
/// The query string is dropped, which covers the legacy `/?key=` form.
pub fn redacted_path(path: &str) -> String {
    match path.strip_prefix(IMAGE_PATH_PREFIX) {
        Some(rest) if !rest.is_empty() => format!("{IMAGE_PATH_PREFIX}:key"),
        _ => path.to_string(),
    }
}

/// Span for `TraceLayer` that records the redacted path instead of the URI.
pub fn request_span(request: &Request<Body>) -> Span {
    info_span!(
        "request",
        method = %request.method(),
        path = %redacted_path(request.uri().path()),
    )
}

/// Request logging middleware.
///
/// Image keys never reach the access log; see [`redacted_path`].
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = redacted_path(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        warn!(
            target: "http",
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "HTTP request failed"
        );
    } else {
        info!(
            target: "http",
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "HTTP request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_key_is_redacted() {
        assert_eq!(
            redacted_path("/api/v1/images/aB3xYz9QkLmNoPq"),
            "/api/v1/images/:key"
        );
    }

    #[test]
    fn test_other_paths_pass_through() {
        assert_eq!(redacted_path("/"), "/");
        assert_eq!(redacted_path("/health"), "/health");
        assert_eq!(redacted_path("/api/v1/images/"), "/api/v1/images/");
        assert_eq!(redacted_path("/post"), "/post");
    }
}
