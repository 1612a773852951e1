//! Server startup utilities.

use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
    ______     __
   / ____/__  / /_  ___  ____ ___  ___  _________ _
  / __/ / _ \/ __ \/ _ \/ __ `__ \/ _ \/ ___/ __ `/
 / /___/  __/ / / /  __/ / / / / /  __/ /  / /_/ /
/_____/ .___/_/ /_/\___/_/ /_/ /_/\___/_/   \__,_/
     /_/
    "#);
}

/// Prints server startup information.
pub fn print_startup_info(addr: &str, metrics_path: Option<&str>) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("Upload:    POST http://{}/api/v1/images", addr);
    info!("Fetch:     GET  http://{}/api/v1/images/<key>", addr);
    info!("Legacy:    POST http://{}/post, GET http://{}/?key=<key>", addr, addr);
    info!("Health:    http://{}/health", addr);
    if let Some(path) = metrics_path {
        info!("Metrics:   http://{}{}", addr, path);
    }
    info!("{}", separator);
}
