//! Lifecycle tests for the media pipeline, driven through a mock database
//! and a recording object store so ordering guarantees are observable.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::storage::{ObjectStore, StorageError};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
use uuid::Uuid;

use server::entity::media;
use server::pipeline::{MediaPipeline, PipelineError};
use server::utils::short_id::SHORT_ID_LEN;

/// Object store stub that counts calls and can be told to fail.
#[derive(Default)]
struct RecordingStore {
    puts: AtomicUsize,
    deletes: AtomicUsize,
    fail_put: bool,
    fail_delete: bool,
}

impl RecordingStore {
    fn failing_put() -> Self {
        Self {
            fail_put: true,
            ..Self::default()
        }
    }

    fn failing_delete() -> Self {
        Self {
            fail_delete: true,
            ..Self::default()
        }
    }

    fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put(
        &self,
        key: &str,
        _bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, StorageError> {
        if self.fail_put {
            return Err(StorageError::Backend("put refused".into()));
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(self.public_url(key))
    }

    async fn delete(&self, _key: &str) -> Result<(), StorageError> {
        if self.fail_delete {
            return Err(StorageError::Backend("delete refused".into()));
        }
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("http://store.test/{key}")
    }
}

fn sample_record() -> media::Model {
    let id = Uuid::new_v4();
    media::Model {
        id,
        short_id: "AbCdEfGh1234".into(),
        file_name: "photo.jpg".into(),
        mime_type: "image/jpeg".into(),
        size_bytes: 123,
        storage_key: format!("uploads/{id}.jpg"),
        backend_url: format!("http://store.test/uploads/{id}.jpg"),
        created_at: Utc::now(),
        delete_at: None,
    }
}

mod ingest {
    use super::*;

    #[tokio::test]
    async fn records_metadata_after_confirmed_backend_write() {
        let store = RecordingStore::default();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // Short id existence check comes back empty.
            .append_query_results([Vec::<media::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let record = MediaPipeline::new(&db, &store)
            .ingest("cat.png".into(), "image/png".into(), vec![7u8; 42])
            .await
            .unwrap();

        assert_eq!(store.puts(), 1);
        assert_eq!(store.deletes(), 0);
        assert_eq!(record.short_id.len(), SHORT_ID_LEN);
        assert_eq!(record.file_name, "cat.png");
        assert_eq!(record.mime_type, "image/png");
        assert_eq!(record.size_bytes, 42);
        assert_eq!(record.storage_key, format!("uploads/{}.png", record.id));
        assert_eq!(
            record.backend_url,
            format!("http://store.test/uploads/{}.png", record.id)
        );
        assert!(record.delete_at.is_none());
    }

    #[tokio::test]
    async fn failed_backend_write_records_nothing() {
        let store = RecordingStore::failing_put();
        // No query or exec expectations: the pipeline must not reach the
        // database when the backend write fails.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = MediaPipeline::new(&db, &store)
            .ingest("cat.png".into(), "image/png".into(), vec![1, 2, 3])
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::BackendWrite(_)));
        assert_eq!(store.deletes(), 0);
    }

    #[tokio::test]
    async fn regenerates_when_candidate_is_taken() {
        let store = RecordingStore::default();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // First candidate is already taken, second is free.
            .append_query_results([vec![sample_record()], Vec::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let record = MediaPipeline::new(&db, &store)
            .ingest("dog.jpg".into(), "image/jpeg".into(), vec![0u8; 10])
            .await
            .unwrap();

        assert_eq!(store.puts(), 1);
        assert_eq!(record.short_id.len(), SHORT_ID_LEN);
    }

    #[tokio::test]
    async fn removes_stored_object_when_insert_fails() {
        let store = RecordingStore::default();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<media::Model>::new()])
            .append_exec_errors([DbErr::Custom("insert refused".into())])
            .into_connection();

        let err = MediaPipeline::new(&db, &store)
            .ingest("doc.pdf".into(), "application/pdf".into(), vec![0u8; 10])
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Db(_)));
        // The orphaned object was compensated away.
        assert_eq!(store.puts(), 1);
        assert_eq!(store.deletes(), 1);
    }
}

mod removal {
    use super::*;

    #[tokio::test]
    async fn deletes_backend_object_then_metadata() {
        let store = RecordingStore::default();
        let record = sample_record();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![record.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        MediaPipeline::new(&db, &store)
            .remove(&record.short_id)
            .await
            .unwrap();

        assert_eq!(store.deletes(), 1);
    }

    #[tokio::test]
    async fn backend_failure_retains_the_record() {
        let store = RecordingStore::failing_delete();
        let record = sample_record();
        // No exec expectation: the row must survive a failed backend delete.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![record.clone()]])
            .into_connection();

        let err = MediaPipeline::new(&db, &store)
            .remove(&record.short_id)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::BackendRemoval(_)));
    }

    #[tokio::test]
    async fn missing_record_touches_no_backend_state() {
        let store = RecordingStore::default();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<media::Model>::new()])
            .into_connection();

        let err = MediaPipeline::new(&db, &store)
            .remove("nosuchhandle")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::NotFound));
        assert_eq!(store.deletes(), 0);
    }

    #[tokio::test]
    async fn orphaned_row_is_reported_distinctly() {
        let store = RecordingStore::default();
        let record = sample_record();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![record.clone()]])
            .append_exec_errors([DbErr::Custom("row delete refused".into())])
            .into_connection();

        let err = MediaPipeline::new(&db, &store)
            .remove(&record.short_id)
            .await
            .unwrap_err();

        // The backend object is gone; the caller must learn this is not the
        // same failure as a retained record.
        assert!(matches!(err, PipelineError::MetadataRemoval(_)));
        assert_eq!(store.deletes(), 1);
    }
}

mod scheduling {
    use super::*;

    #[tokio::test]
    async fn stamps_a_future_removal_time() {
        let store = RecordingStore::default();
        let record = sample_record();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![record.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let before = Utc::now();
        let delete_at = MediaPipeline::new(&db, &store)
            .schedule_removal(&record.short_id, 7)
            .await
            .unwrap();

        let lower = before + chrono::Duration::days(7) - chrono::Duration::minutes(1);
        let upper = Utc::now() + chrono::Duration::days(7);
        assert!(delete_at >= lower && delete_at <= upper);
        // Scheduling never touches the backend object.
        assert_eq!(store.deletes(), 0);
    }

    #[tokio::test]
    async fn unknown_handle_is_not_found() {
        let store = RecordingStore::default();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<media::Model>::new()])
            .into_connection();

        let err = MediaPipeline::new(&db, &store)
            .schedule_removal("nosuchhandle", 7)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::NotFound));
    }
}
