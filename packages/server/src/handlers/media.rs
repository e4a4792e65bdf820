use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::instrument;

use common::transcode;

use crate::error::{AppError, ErrorBody};
use crate::models::media::{DeleteResponse, MediaLinkResponse, MediaResponse};
use crate::pipeline::MediaPipeline;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Media",
    operation_id = "uploadMedia",
    summary = "Upload a file",
    description = "Uploads a file from the `file` multipart field. Image payloads are \
        re-encoded to fit under the configured size ceiling (quality reduction first, \
        then downscaling); the image format itself never changes. Note that images are \
        re-encoded even when already under the ceiling, so the stored bytes can differ \
        from the upload. Non-image payloads are stored verbatim.",
    request_body(content_type = "multipart/form-data", description = "File upload"),
    responses(
        (status = 201, description = "Media stored", body = MediaResponse),
        (status = 400, description = "Validation or image error (VALIDATION_ERROR, DECODE_ERROR, UNSUPPORTED_FORMAT)", body = ErrorBody),
        (status = 500, description = "Backend or database failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<(Option<String>, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().map(|s| s.to_string());
                let claimed_type = field.content_type().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?;
                file = Some((file_name, claimed_type, data.to_vec()));
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let (file_name, claimed_type, data) =
        file.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    let file_name =
        file_name.ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;

    // The client header is only a claim; for images the transcoder resolves
    // the real type by sniffing the bytes.
    let claimed_type = claimed_type
        .or_else(|| {
            mime_guess::from_path(&file_name)
                .first()
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| "application/octet-stream".into());

    let (payload, mime_type) = if claimed_type.starts_with("image/") {
        let ceiling = state.config.media.max_image_bytes;
        let output = tokio::task::spawn_blocking(move || transcode::transcode(&data, ceiling))
            .await
            .map_err(|e| AppError::Internal(format!("Transcode task failed: {e}")))??;
        (output.bytes, output.mime_type.to_string())
    } else {
        (data, claimed_type)
    };

    let record = MediaPipeline::new(&state.db, &*state.store)
        .ingest(file_name, mime_type, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(MediaResponse::from(record))))
}

#[utoipa::path(
    get,
    path = "/access/{short_id}",
    tag = "Media",
    operation_id = "accessMedia",
    summary = "Stream a stored media item",
    description = "Looks up the record for `short_id`, fetches the object from the \
        storage backend and streams it back with the upstream content type.",
    params(("short_id" = String, Path, description = "Public media handle")),
    responses(
        (status = 200, description = "Media content"),
        (status = 404, description = "Unknown short id (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Backend fetch failed (UPSTREAM_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn access_media(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
) -> Result<Response, AppError> {
    let record = MediaPipeline::new(&state.db, &*state.store)
        .find(&short_id)
        .await?;

    let upstream = state
        .http
        .get(&record.backend_url)
        .send()
        .await
        .map_err(|e| AppError::UpstreamUnavailable(format!("Backend fetch failed: {e}")))?;

    if !upstream.status().is_success() {
        return Err(AppError::UpstreamUnavailable(format!(
            "Backend returned {}",
            upstream.status()
        )));
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(&record.mime_type)
        .to_string();

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}

#[utoipa::path(
    get,
    path = "/access-link/{short_id}",
    tag = "Media",
    operation_id = "accessMediaLink",
    summary = "Resolve a media item to its direct backend URL",
    description = "Returns the backend URL for `short_id` without fetching any content.",
    params(("short_id" = String, Path, description = "Public media handle")),
    responses(
        (status = 200, description = "Direct link", body = MediaLinkResponse),
        (status = 404, description = "Unknown short id (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn access_link(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
) -> Result<Json<MediaLinkResponse>, AppError> {
    let record = MediaPipeline::new(&state.db, &*state.store)
        .find(&short_id)
        .await?;

    Ok(Json(MediaLinkResponse {
        link: record.backend_url,
    }))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct DeleteParams {
    /// Schedule removal this many days out instead of deleting immediately.
    pub after_days: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/delete/{short_id}",
    tag = "Media",
    operation_id = "deleteMedia",
    summary = "Delete a media item, now or later",
    description = "Without `after_days`, removes the backend object and then the \
        metadata record. With `after_days`, stamps the record for future removal by \
        the reaper and leaves it readable until then. A partially completed removal \
        is reported as PARTIAL_FAILURE and is safe to retry.",
    params(
        ("short_id" = String, Path, description = "Public media handle"),
        DeleteParams,
    ),
    responses(
        (status = 200, description = "Deleted or scheduled", body = DeleteResponse),
        (status = 400, description = "Invalid parameters (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Unknown short id (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Partially completed removal (PARTIAL_FAILURE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_media(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<DeleteResponse>, AppError> {
    let pipeline = MediaPipeline::new(&state.db, &*state.store);

    match params.after_days {
        Some(days) if days < 0 => Err(AppError::Validation(
            "after_days must be non-negative".into(),
        )),
        Some(days) => {
            let delete_at = pipeline.schedule_removal(&short_id, days).await?;
            Ok(Json(DeleteResponse {
                message: "scheduled",
                delete_at: Some(delete_at),
            }))
        }
        None => {
            pipeline.remove(&short_id).await?;
            Ok(Json(DeleteResponse {
                message: "deleted",
                delete_at: None,
            }))
        }
    }
}
