use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::media;

/// Response DTO for a stored media item.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MediaResponse {
    /// Internal media ID (UUIDv4).
    #[schema(example = "0a85c3a2-78e9-4a3c-9be1-c1a9e2f8d101")]
    pub id: String,
    /// Public 12-character handle.
    #[schema(example = "pQ3xL9_aZb0K")]
    pub short_id: String,
    /// Filename as uploaded.
    #[schema(example = "holiday.jpg")]
    pub file_name: String,
    /// Content type after transcoding.
    #[schema(example = "image/jpeg")]
    pub mime_type: String,
    /// Stored size in bytes, measured after transcoding.
    #[schema(example = 184257)]
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<media::Model> for MediaResponse {
    fn from(model: media::Model) -> Self {
        Self {
            id: model.id.to_string(),
            short_id: model.short_id,
            file_name: model.file_name,
            mime_type: model.mime_type,
            size_bytes: model.size_bytes,
            created_at: model.created_at,
        }
    }
}

/// Response DTO for link retrieval.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MediaLinkResponse {
    /// Direct backend URL for the stored object.
    #[schema(example = "https://cdn.example.com/media/uploads/0a85c3a2.jpg")]
    pub link: String,
}

/// Response DTO for deletion.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    #[schema(example = "deleted")]
    pub message: &'static str,
    /// Present when removal was scheduled instead of executed.
    pub delete_at: Option<DateTime<Utc>>,
}

/// Response DTO for the liveness endpoint.
#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = "Media service online")]
    pub message: &'static str,
}
