//! # Ephemera Server
//!
//! Main entry point: loads configuration, wires the two storage tiers behind
//! the image service and serves the HTTP API until a shutdown signal arrives.

use ephemera_config::{AppConfig, ConfigLoader};
use ephemera_core::{telemetry::init_telemetry, EphemeraError, EphemeraResult};
use ephemera_repository::{create_pool, DatabasePoolInterface};
use ephemera_rest::{create_router, AppState};
use ephemera_server::{
    di::{create_cache, AppModuleBuilder},
    startup::{print_banner, print_startup_info},
};
use ephemera_service::metrics::register_metrics;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Application error: {}", e);
        eprintln!("ephemera-server: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> EphemeraResult<()> {
    let config_loader = ConfigLoader::from_default_location()?;
    let config = config_loader.get().await;

    init_telemetry(&config.observability.telemetry(&config.app.name))?;
    print_banner();

    info!("Starting Ephemera server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    serve(config).await
}

async fn serve(config: AppConfig) -> EphemeraResult<()> {
    let metrics = if config.observability.metrics_enabled {
        Some(install_metrics()?)
    } else {
        None
    };

    let db_pool = create_pool(&config.database).await?;
    if config.database.run_migrations {
        db_pool.run_migrations().await?;
    }

    let cache = create_cache(&config.cache, &config.redis)?;

    let module = AppModuleBuilder::new()
        .with_database_pool(db_pool.clone())
        .with_cache(cache)
        .with_image_config(config.images.clone())
        .build()?;

    let mut state = AppState::new(module.image_service(), module.db_pool());
    if let Some(handle) = metrics {
        state = state.with_metrics(handle);
    }

    let router = create_router(state, &config.server, &config.observability);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| EphemeraError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

    print_startup_info(
        &addr,
        config
            .observability
            .metrics_enabled
            .then_some(config.observability.metrics_path.as_str()),
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| EphemeraError::Internal(format!("HTTP server error: {}", e)))?;

    db_pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

fn install_metrics() -> EphemeraResult<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| EphemeraError::Configuration(format!("Failed to install metrics recorder: {}", e)))?;
    register_metrics();
    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
