use std::fmt;

use chrono::Utc;
use common::storage::{ObjectStore, StorageError};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set, SqlErr, sea_query::Expr,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::entity::media;
use crate::utils::{object_key, short_id};

/// Attempts at generating and inserting a short id before giving up. A
/// collision needs two handles drawn from 64^12 possibilities, so running
/// out of attempts indicates something badly wrong (alert, don't retry).
const SHORT_ID_ATTEMPTS: usize = 8;

/// Errors from the media lifecycle operations.
#[derive(Debug)]
pub enum PipelineError {
    /// No record matches the given short id.
    NotFound,
    /// The object store rejected the write; no metadata was recorded.
    BackendWrite(StorageError),
    /// Deletion: the backend object could not be removed. The metadata row
    /// was retained so the caller can retry.
    BackendRemoval(StorageError),
    /// Deletion: the backend object is gone but the row deletion failed.
    /// Retrying the deletion is safe since backend removal is ensure-absent.
    MetadataRemoval(DbErr),
    /// Short id generation kept colliding past the attempt bound.
    ShortIdExhausted,
    Db(DbErr),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "media not found"),
            Self::BackendWrite(e) => write!(f, "backend write failed: {e}"),
            Self::BackendRemoval(e) => write!(f, "backend removal failed: {e}"),
            Self::MetadataRemoval(e) => write!(f, "metadata removal failed: {e}"),
            Self::ShortIdExhausted => write!(f, "short id generation exhausted"),
            Self::Db(e) => write!(f, "database error: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<DbErr> for PipelineError {
    fn from(err: DbErr) -> Self {
        Self::Db(err)
    }
}

/// Media lifecycle operations: ingestion, lookup, removal, scheduling.
///
/// All database access goes through the borrowed connection so callers can
/// hand in a transaction, the pooled connection, or a mock.
pub struct MediaPipeline<'a, C: ConnectionTrait> {
    conn: &'a C,
    store: &'a dyn ObjectStore,
}

impl<'a, C: ConnectionTrait> MediaPipeline<'a, C> {
    pub fn new(conn: &'a C, store: &'a dyn ObjectStore) -> Self {
        Self { conn, store }
    }

    /// Persist a payload and record its metadata.
    ///
    /// The backend write happens first and the row insert only after it is
    /// confirmed, so an aborted ingestion never leaves a record pointing at
    /// nothing. If the insert ultimately fails, the freshly written object
    /// is removed again (best effort).
    pub async fn ingest(
        &self,
        file_name: String,
        mime_type: String,
        payload: Vec<u8>,
    ) -> Result<media::Model, PipelineError> {
        let id = Uuid::new_v4();
        let storage_key = object_key::derive_key(id, &mime_type);

        let backend_url = self
            .store
            .put(&storage_key, &payload, &mime_type)
            .await
            .map_err(PipelineError::BackendWrite)?;

        let size_bytes = i64::try_from(payload.len()).unwrap_or(i64::MAX);
        let created_at = Utc::now();

        for attempt in 1..=SHORT_ID_ATTEMPTS {
            let candidate = short_id::generate();

            let taken = media::Entity::find()
                .filter(media::Column::ShortId.eq(&candidate))
                .one(self.conn)
                .await;
            let taken = match taken {
                Ok(existing) => existing.is_some(),
                Err(e) => {
                    self.abandon_object(&storage_key).await;
                    return Err(e.into());
                }
            };
            if taken {
                warn!(attempt, "Short id candidate already taken, regenerating");
                continue;
            }

            let row = media::Model {
                id,
                short_id: candidate,
                file_name: file_name.clone(),
                mime_type: mime_type.clone(),
                size_bytes,
                storage_key: storage_key.clone(),
                backend_url: backend_url.clone(),
                created_at,
                delete_at: None,
            };
            let model = media::ActiveModel {
                id: Set(row.id),
                short_id: Set(row.short_id.clone()),
                file_name: Set(row.file_name.clone()),
                mime_type: Set(row.mime_type.clone()),
                size_bytes: Set(row.size_bytes),
                storage_key: Set(row.storage_key.clone()),
                backend_url: Set(row.backend_url.clone()),
                created_at: Set(row.created_at),
                delete_at: Set(None),
            };

            match media::Entity::insert(model)
                .exec_without_returning(self.conn)
                .await
            {
                Ok(_) => return Ok(row),
                // The unique constraint is the final authority; landing here
                // means another writer took the handle between our existence
                // check and the insert. Draw a fresh one and try again.
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    warn!(attempt, "Short id collided on insert, regenerating");
                }
                Err(e) => {
                    self.abandon_object(&storage_key).await;
                    return Err(e.into());
                }
            }
        }

        self.abandon_object(&storage_key).await;
        error!(%id, "Short id generation exhausted after {SHORT_ID_ATTEMPTS} attempts");
        Err(PipelineError::ShortIdExhausted)
    }

    /// Look up a record by its public handle.
    pub async fn find(&self, short_id: &str) -> Result<media::Model, PipelineError> {
        media::Entity::find()
            .filter(media::Column::ShortId.eq(short_id))
            .one(self.conn)
            .await?
            .ok_or(PipelineError::NotFound)
    }

    /// Remove a media item: backend object first, metadata row second.
    ///
    /// The ordering is a compensating-action pattern, not a transaction. If
    /// the backend removal fails the row survives and the caller retries.
    /// If the row deletion fails afterwards, retrying still converges: the
    /// lookup finds the row, the backend delete is ensure-absent, and only
    /// the row deletion remains to be redone.
    pub async fn remove(&self, short_id: &str) -> Result<(), PipelineError> {
        let record = self.find(short_id).await?;

        if let Err(e) = self.store.delete(&record.storage_key).await {
            warn!(
                short_id,
                key = %record.storage_key,
                error = %e,
                "Backend removal failed, record retained"
            );
            return Err(PipelineError::BackendRemoval(e));
        }

        match media::Entity::delete_by_id(record.id).exec(self.conn).await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(
                    short_id,
                    media_id = %record.id,
                    key = %record.storage_key,
                    error = %e,
                    "Object removed but metadata delete failed; row pending reconciliation"
                );
                Err(PipelineError::MetadataRemoval(e))
            }
        }
    }

    /// Mark a media item for future removal instead of deleting it now.
    /// The reaper that honors `delete_at` runs outside this service.
    pub async fn schedule_removal(
        &self,
        short_id: &str,
        after_days: i64,
    ) -> Result<chrono::DateTime<Utc>, PipelineError> {
        let record = self.find(short_id).await?;
        let delete_at = Utc::now() + chrono::Duration::days(after_days);

        media::Entity::update_many()
            .col_expr(media::Column::DeleteAt, Expr::value(delete_at))
            .filter(media::Column::Id.eq(record.id))
            .exec(self.conn)
            .await?;

        Ok(delete_at)
    }

    /// Best-effort removal of an object whose metadata row never landed.
    async fn abandon_object(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            error!(
                key,
                error = %e,
                "Failed to remove orphaned object after aborted ingestion"
            );
        }
    }
}
