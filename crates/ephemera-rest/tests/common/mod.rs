//! Test application wired to an in-memory database and cache.

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use chrono::{TimeZone, Utc};
use ephemera_config::{DatabaseConfig, ObservabilityConfig, ServerConfig};
use ephemera_core::{KeyGenerator, ManualClock};
use ephemera_repository::{DatabasePool, DatabasePoolInterface, SqliteImageRepository};
use ephemera_rest::{create_router, AppState};
use ephemera_service::{ImageServiceImpl, ImageSettings, JpegCodec, MemoryImageCache};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;

const BOUNDARY: &str = "ephemera-test-boundary";

/// Full router over a real SQLite store and an in-process cache.
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub pool: Arc<DatabasePool>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_server_config(ServerConfig::default()).await
    }

    pub async fn with_server_config(server: ServerConfig) -> Self {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            min_connections: 1,
            max_connections: 1,
            ..DatabaseConfig::default()
        };
        let pool = Arc::new(DatabasePool::new(&config).await.unwrap());
        pool.run_migrations().await.unwrap();

        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        ));

        let service = ImageServiceImpl::new(
            Arc::new(SqliteImageRepository::new(pool.clone())),
            Arc::new(MemoryImageCache::new(64, None)),
            Arc::new(JpegCodec::default()),
            clock.clone(),
            KeyGenerator::default(),
            ImageSettings::default(),
        );

        let state = AppState::new(Arc::new(service), pool.clone());
        let observability = ObservabilityConfig {
            metrics_enabled: false,
            ..ObservabilityConfig::default()
        };
        let router = create_router(state, &server, &observability);

        Self {
            router,
            clock,
            pool,
        }
    }
}

/// A small PNG image.
pub fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 4, Rgb([10, 120, 200])));
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
}

/// Builds a multipart POST with a single file field.
pub fn multipart_request(uri: &str, field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Builds a GET request.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
