//! Image upload and retrieval controller.

use crate::{
    responses::{ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use ephemera_core::{EphemeraError, ImageRecord};
use ephemera_service::{ImageUpload, RetrievalOutcome};
use serde::Deserialize;
use tracing::debug;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

const NOT_FOUND_MESSAGE: &str = "Image not found or expired";
const STORE_FAILURE_MESSAGE: &str = "Failed to store the image.";

/// How a retrieved image is written to the response body.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    /// Raw JPEG bytes.
    #[default]
    Raw,
    /// Standard base64 text.
    Base64,
}

/// Query parameters for `GET /api/v1/images/:key`.
#[derive(Debug, Default, Deserialize)]
pub struct ImageQuery {
    #[serde(default)]
    pub encoding: ImageEncoding,
}

/// Query parameters for the legacy `GET /?key=`.
#[derive(Debug, Default, Deserialize)]
pub struct LegacyImageQuery {
    pub key: Option<String>,
    #[serde(default)]
    pub encoding: ImageEncoding,
}

/// Creates the image router, nested under `/api/v1/images`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_image))
        .route("/:key", get(get_image))
}

/// Creates the legacy form routes served at the root.
pub fn legacy_router() -> Router<AppState> {
    Router::new()
        .route("/", get(legacy_get_image))
        .route("/post", post(legacy_upload_image))
}

/// Upload an image; responds `201` with the key as plain text.
async fn upload_image(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Response> {
    let key = store_upload(&state, multipart).await?;
    Ok((StatusCode::CREATED, key).into_response())
}

/// Upload an image through the legacy form route; responds `200`.
async fn legacy_upload_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let key = store_upload(&state, multipart).await?;
    Ok((StatusCode::OK, key).into_response())
}

/// Fetch an image by key.
async fn get_image(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<ImageQuery>,
) -> ApiResult<Response> {
    render_image(&state, &key, query.encoding).await
}

/// Fetch an image by `?key=`.
async fn legacy_get_image(
    State(state): State<AppState>,
    Query(query): Query<LegacyImageQuery>,
) -> ApiResult<Response> {
    let key = query
        .key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| EphemeraError::validation("Supply the image key as ?key=<key>"))?;

    render_image(&state, &key, query.encoding).await
}

async fn store_upload(state: &AppState, mut multipart: Multipart) -> ApiResult<String> {
    let upload = read_upload(&mut multipart).await?;
    debug!(upload = ?upload, "Upload received");

    state
        .image_service
        .store(upload)
        .await
        .map_err(|e| match e {
            EphemeraError::Decode(_) => AppError::from(e),
            other => AppError::with_message(other, STORE_FAILURE_MESSAGE),
        })
}

/// Pull the `file` field out of a multipart body, skipping any other fields.
async fn read_upload(multipart: &mut Multipart) -> ApiResult<ImageUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| EphemeraError::validation(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| EphemeraError::validation(format!("Failed to read upload: {}", e)))?;

        return Ok(ImageUpload::new(filename, bytes.to_vec()));
    }

    Err(EphemeraError::validation(format!("Missing multipart field '{}'", UPLOAD_FIELD)).into())
}

async fn render_image(state: &AppState, key: &str, encoding: ImageEncoding) -> ApiResult<Response> {
    match state.image_service.retrieve(key).await {
        RetrievalOutcome::Found(record) => Ok(image_response(record, encoding)),
        RetrievalOutcome::NotFound => Err(AppError::with_message(
            EphemeraError::not_found("Image", key),
            NOT_FOUND_MESSAGE,
        )),
    }
}

fn image_response(record: ImageRecord, encoding: ImageEncoding) -> Response {
    match encoding {
        ImageEncoding::Raw => (
            [
                (header::CONTENT_TYPE, "image/jpeg"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            record.payload,
        )
            .into_response(),
        ImageEncoding::Base64 => (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            record.to_base64(),
        )
            .into_response(),
    }
}
