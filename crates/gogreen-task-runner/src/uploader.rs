/*
[INPUT]:  UploadConfig, Clock, raw photo bytes
[OUTPUT]: PhotoRecord after a randomized storage latency, or a simulated failure
[POS]:    Collaborator implementation - stands in for object storage
[UPDATE]: When simulated latency or failure behaviour changes
*/

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, ensure};
use async_trait::async_trait;
use gogreen_task_core::upload::photo_record;
use gogreen_task_core::{Clock, PhotoRecord, PhotoUploader, TaskId, UploadError};
use rand::Rng;
use tracing::debug;

use crate::config::UploadConfig;

/// Uploader that waits a random latency and keeps nothing.
pub struct SimulatedPhotoUploader {
    clock: Arc<dyn Clock>,
    latency_ms: RangeInclusive<u64>,
    failure_rate: f64,
}

impl SimulatedPhotoUploader {
    /// `latency_ms` must be non-empty and `failure_rate` within [0, 1].
    pub fn new(
        clock: Arc<dyn Clock>,
        latency_ms: RangeInclusive<u64>,
        failure_rate: f64,
    ) -> Result<Self> {
        ensure!(
            !latency_ms.is_empty(),
            "upload latency range {}..={} is empty",
            latency_ms.start(),
            latency_ms.end()
        );
        ensure!(
            (0.0..=1.0).contains(&failure_rate),
            "upload failure rate must be within [0, 1], got {failure_rate}"
        );
        Ok(Self {
            clock,
            latency_ms,
            failure_rate,
        })
    }

    pub fn from_config(config: &UploadConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::new(
            clock,
            config.min_latency_ms..=config.max_latency_ms,
            config.failure_rate,
        )
    }
}

#[async_trait]
impl PhotoUploader for SimulatedPhotoUploader {
    async fn upload(
        &self,
        task_id: &TaskId,
        payload: Vec<u8>,
    ) -> std::result::Result<PhotoRecord, UploadError> {
        if payload.is_empty() {
            return Err(UploadError::EmptyPayload);
        }

        let (latency_ms, fails) = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(self.latency_ms.clone()),
                rng.gen_bool(self.failure_rate),
            )
        };

        debug!(%task_id, bytes = payload.len(), latency_ms, "simulating photo upload");
        tokio::time::sleep(Duration::from_millis(latency_ms)).await;

        if fails {
            return Err(UploadError::Rejected("simulated storage failure".to_string()));
        }
        Ok(photo_record(task_id, self.clock.now()))
    }
}
