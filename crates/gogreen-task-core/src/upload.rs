/*
[INPUT]:  Task id and raw photo bytes
[OUTPUT]: Stored-object descriptor (url + uploaded_at) or UploadError
[POS]:    Collaborator seam - photo storage behind an async trait
[UPDATE]: When the upload contract or the in-memory implementation changes
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::UploadError;
use crate::types::{PhotoRecord, TaskId};

/// Stores a photo and describes where it went.
///
/// The engine never calls this itself; hosts await it outside the engine
/// lock and feed the outcome back through `complete_upload`.
#[async_trait]
pub trait PhotoUploader: Send + Sync {
    async fn upload(&self, task_id: &TaskId, payload: Vec<u8>) -> Result<PhotoRecord, UploadError>;
}

/// Immediate uploader that keeps nothing but a counter.
pub struct MemoryPhotoUploader {
    clock: Arc<dyn Clock>,
    uploads: AtomicUsize,
    failures_pending: AtomicUsize,
}

impl MemoryPhotoUploader {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            uploads: AtomicUsize::new(0),
            failures_pending: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` uploads fail with `Rejected`.
    pub fn fail_next(&self, count: usize) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    /// Number of successful uploads so far.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> bool {
        self.failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl PhotoUploader for MemoryPhotoUploader {
    async fn upload(&self, task_id: &TaskId, payload: Vec<u8>) -> Result<PhotoRecord, UploadError> {
        if payload.is_empty() {
            return Err(UploadError::EmptyPayload);
        }
        if self.take_failure() {
            return Err(UploadError::Rejected("injected failure".to_string()));
        }

        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(photo_record(task_id, self.clock.now()))
    }
}

/// Descriptor for an object stored under the in-memory scheme.
pub fn photo_record(task_id: &TaskId, uploaded_at: chrono::DateTime<chrono::Utc>) -> PhotoRecord {
    let object = Uuid::new_v4().simple().to_string();
    PhotoRecord::new(format!("memory://photos/{task_id}/{object}"), uploaded_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};

    fn uploader() -> MemoryPhotoUploader {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        MemoryPhotoUploader::new(Arc::new(ManualClock::new(start)))
    }

    #[tokio::test]
    async fn test_upload_returns_descriptor() {
        let uploader = uploader();
        let record = uploader
            .upload(&TaskId::new("T-9"), vec![0xFF, 0xD8])
            .await
            .unwrap();
        assert!(record.url.starts_with("memory://photos/T-9/"));
        assert_eq!(
            record.uploaded_at,
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
        );
        assert_eq!(uploader.upload_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_payload_rejected() {
        let uploader = uploader();
        let err = uploader.upload(&TaskId::new("T-9"), Vec::new()).await;
        assert_eq!(err, Err(UploadError::EmptyPayload));
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let uploader = uploader();
        uploader.fail_next(1);
        assert!(uploader.upload(&TaskId::new("T-9"), vec![1]).await.is_err());
        assert!(uploader.upload(&TaskId::new("T-9"), vec![1]).await.is_ok());
        assert_eq!(uploader.upload_count(), 1);
    }
}
