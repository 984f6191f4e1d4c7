use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::BlobKey;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/media/{key}",
    tag = "Media",
    operation_id = "getMedia",
    summary = "Serve an uploaded file",
    description = "Streams a blob out of local storage. Keys are opaque paths issued by the \
        image upload endpoint.",
    params(("key" = String, Path, description = "Blob key")),
    responses(
        (status = 200, description = "Blob content"),
        (status = 400, description = "Malformed key (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Blob not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(key))]
pub async fn get_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let key = BlobKey::parse(&key)?;

    let size = state.blob_store.size(&key).await?;
    let reader = state.blob_store.get_stream(&key).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let content_type = mime_guess::from_path(key.file_name())
        .first_raw()
        .unwrap_or("application/octet-stream");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        // Keys embed a UUID, so content behind a key never changes.
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}
