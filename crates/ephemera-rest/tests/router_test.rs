//! HTTP tests for the image and health routes.

mod common;

use axum::{
    body::Body,
    http::{header, Response, StatusCode},
};
use chrono::Duration;
use common::{get, multipart_request, png_bytes, TestApp};
use axum::http::Request;
use ephemera_config::ServerConfig;
use ephemera_core::KEY_LENGTH;
use ephemera_repository::DatabasePoolInterface;
use tower::ServiceExt;

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

async fn upload(app: &TestApp, uri: &str) -> String {
    let response = app
        .router
        .clone()
        .oneshot(multipart_request(uri, "file", "photo.png", &png_bytes()))
        .await
        .unwrap();
    assert!(response.status().is_success());
    String::from_utf8(body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new().await;

    let response = app.router.clone().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_live_endpoint() {
    let app = TestApp::new().await;
    let response = app.router.clone().oneshot(get("/live")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ready_tracks_database() {
    let app = TestApp::new().await;

    let response = app.router.clone().oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    app.pool.close().await;

    let response = app.router.clone().oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["database"], "down");
}

#[tokio::test]
async fn test_upload_and_fetch_jpeg() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/api/v1/images", "file", "photo.png", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let key = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(key.len(), KEY_LENGTH);

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/api/v1/images/{key}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    let body = body_bytes(response).await;
    assert_eq!(body[..2], [0xFF_u8, 0xD8]);
}

#[tokio::test]
async fn test_legacy_routes() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/post", "file", "photo.png", &png_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let key = String::from_utf8(body_bytes(response).await).unwrap();

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/?key={key}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
}

#[tokio::test]
async fn test_base64_encoding() {
    let app = TestApp::new().await;
    let key = upload(&app, "/api/v1/images").await;

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/api/v1/images/{key}?encoding=base64")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    // Base64 of the JPEG SOI marker.
    assert!(text.starts_with("/9j/"));
}

#[tokio::test]
async fn test_legacy_get_requires_key() {
    let app = TestApp::new().await;

    for uri in ["/", "/?key="] {
        let response = app.router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_unknown_keys_share_one_not_found_body() {
    let app = TestApp::new().await;

    let first = app
        .router
        .clone()
        .oneshot(get("/api/v1/images/nonexistent-key"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::NOT_FOUND);
    let first = body_bytes(first).await;

    let second = app
        .router
        .clone()
        .oneshot(get("/api/v1/images/another-missing-key"))
        .await
        .unwrap();
    let second = body_bytes(second).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_expired_image_is_not_found() {
    let app = TestApp::new().await;
    let key = upload(&app, "/api/v1/images").await;

    app.clock.advance(Duration::minutes(5) + Duration::seconds(1));

    for _ in 0..2 {
        let response = app
            .router
            .clone()
            .oneshot(get(&format!("/api/v1/images/{key}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_non_image_upload_is_unprocessable() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/api/v1/images", "file", "notes.txt", b"hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"]["code"], "DECODE_ERROR");
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/api/v1/images", "avatar", "photo.png", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_store_failure_is_generic_500() {
    let app = TestApp::new().await;
    app.pool.close().await;

    let response = app
        .router
        .clone()
        .oneshot(multipart_request("/api/v1/images", "file", "photo.png", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["message"], "Failed to store the image.");
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let app = TestApp::new().await;
    let response = app.router.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

fn get_with_origin(uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::ORIGIN, origin)
        .body(Body::empty())
        .unwrap()
}

async fn app_allowing(origins: &[&str]) -> TestApp {
    TestApp::with_server_config(ServerConfig {
        cors_enabled: true,
        cors_origins: origins.iter().map(|o| o.to_string()).collect(),
        ..ServerConfig::default()
    })
    .await
}

#[tokio::test]
async fn test_cors_rejects_unlisted_origin() {
    let app = app_allowing(&["https://allowed.example"]).await;

    let response = app
        .router
        .clone()
        .oneshot(get_with_origin("/health", "https://evil.example"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_echoes_listed_origin() {
    let app = app_allowing(&["https://allowed.example"]).await;

    let response = app
        .router
        .clone()
        .oneshot(get_with_origin("/health", "https://allowed.example"))
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://allowed.example"
    );
}

#[tokio::test]
async fn test_cors_wildcard_allows_any_origin() {
    let app = app_allowing(&["*"]).await;

    let response = app
        .router
        .clone()
        .oneshot(get_with_origin("/health", "https://anyone.example"))
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_some());
}
