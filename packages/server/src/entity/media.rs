use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One stored media item.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media")]
pub struct Model {
    /// UUIDv4 assigned at ingestion.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// 12-character URL-safe handle, the only identifier exposed to clients.
    /// The unique constraint here is the final authority on collisions.
    #[sea_orm(unique)]
    pub short_id: String,

    /// Uploader-supplied filename. Advisory only, never used for addressing.
    pub file_name: String,

    /// Resolved content type after any transcoding.
    pub mime_type: String,

    /// Stored payload size, measured after transcoding.
    pub size_bytes: i64,

    /// Backend object key, `uploads/{id}{extension}`.
    pub storage_key: String,

    /// Backend-resolvable URL, derived from the public base and the key.
    #[sea_orm(column_type = "Text")]
    pub backend_url: String,

    pub created_at: DateTimeUtc,

    /// When set and reached, the row and its object are eligible for the
    /// reaper. Only scheduled deletion writes this.
    pub delete_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
