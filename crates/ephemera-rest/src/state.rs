//! Application state for Axum handlers.

use ephemera_repository::DatabasePoolInterface;
use ephemera_service::ImageService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub image_service: Arc<dyn ImageService>,
    pub db_pool: Arc<dyn DatabasePoolInterface>,
    /// Renders the Prometheus exposition; `None` when metrics are disabled.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        image_service: Arc<dyn ImageService>,
        db_pool: Arc<dyn DatabasePoolInterface>,
    ) -> Self {
        Self {
            image_service,
            db_pool,
            metrics: None,
        }
    }

    /// Attaches a Prometheus handle for the metrics endpoint.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
