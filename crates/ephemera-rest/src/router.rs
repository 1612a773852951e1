//! Main application router.

use crate::{
    controllers::{health_controller, image_controller},
    middleware::{logging_middleware, request_span},
    state::AppState,
};
use axum::{
    extract::DefaultBodyLimit, extract::State, http::HeaderValue, middleware, routing::get, Router,
};
use ephemera_config::{ObservabilityConfig, ServerConfig};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Creates the main application router.
pub fn create_router(
    state: AppState,
    server_config: &ServerConfig,
    observability: &ObservabilityConfig,
) -> Router {
    let cors = create_cors_layer(server_config);

    let mut router = Router::new()
        // Health endpoints
        .merge(health_controller::router())
        // API v1
        .nest("/api/v1/images", image_controller::router())
        // Legacy form routes: GET /?key= and POST /post
        .merge(image_controller::legacy_router());

    if observability.metrics_enabled && state.metrics.is_some() {
        router = router.route(&observability.metrics_path, get(render_metrics));
    }

    let router = router
        .with_state(state)
        .layer(DefaultBodyLimit::max(server_config.max_body_size))
        .layer(RequestBodyLimitLayer::new(server_config.max_body_size))
        .layer(TimeoutLayer::new(server_config.request_timeout()))
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(middleware::from_fn(logging_middleware));

    info!("Router created with image endpoints under /api/v1/images and legacy routes at /");
    router
}

/// Creates a CORS layer based on server configuration.
///
/// `"*"` allows every origin; otherwise only the listed origins are echoed
/// back. Entries that are not valid header values are skipped.
fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if !server_config.cors_enabled {
        return CorsLayer::new();
    }

    if server_config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server_config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Prometheus text exposition.
async fn render_metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
