/*
[INPUT]:  TaskService on a manual clock with in-memory and gated uploaders
[OUTPUT]: Verification of serialized intents, tick publication and stale uploads
[POS]:    Integration tests - runner service behaviour
[UPDATE]: When service orchestration or shutdown changes
*/

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use gogreen_task_core::upload::photo_record;
use gogreen_task_core::{
    Clock, IntentKind, ManualClock, MemoryPhotoUploader, PhotoRecord, PhotoSlot, PhotoUploader,
    TaskError, TaskId, TaskLifecycleEngine, TaskState, UploadError,
};
use gogreen_task_runner::{RunnerConfig, TaskService};
use tokio::sync::Notify;
use tokio_test::assert_ok;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

fn service_with(
    clock: Arc<ManualClock>,
    uploader: Arc<dyn PhotoUploader>,
    tick_period: Duration,
) -> TaskService {
    let engine = TaskLifecycleEngine::new(clock);
    TaskService::new(engine, uploader, tick_period)
}

/// Uploader that holds every upload until released.
struct GatedUploader {
    clock: Arc<dyn Clock>,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl PhotoUploader for GatedUploader {
    async fn upload(&self, task_id: &TaskId, _payload: Vec<u8>) -> Result<PhotoRecord, UploadError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(photo_record(task_id, self.clock.now()))
    }
}

#[tokio::test]
async fn full_flow_through_service() {
    let clock = Arc::new(ManualClock::new(t0()));
    let uploader = Arc::new(MemoryPhotoUploader::new(clock.clone()));
    let service = service_with(clock.clone(), uploader.clone(), Duration::from_secs(1));

    assert_ok!(service.assign("T-2001", "Clear Block A3 drain").await);
    assert_eq!(
        service.allowed_intents("T-2001").await.unwrap(),
        vec![IntentKind::Start]
    );

    assert_ok!(service.start("T-2001").await);
    clock.advance(chrono::Duration::seconds(40));
    let view = assert_ok!(service.upload_before_photo("T-2001", vec![1, 2, 3]).await);
    assert_eq!(view.state, TaskState::BeforeUploaded);
    assert!(
        view.before_photo
            .unwrap()
            .url
            .starts_with("memory://photos/T-2001/")
    );

    assert_ok!(service.mark_complete("T-2001").await);
    let view = assert_ok!(service.upload_after_photo("T-2001", vec![4, 5, 6]).await);
    assert_eq!(view.state, TaskState::Completed);
    assert_eq!(uploader.upload_count(), 2);

    let summary = service.summary().await;
    assert_eq!(summary.total, 1);
    assert_eq!(summary.done, 1);
    assert!(service.allowed_intents("T-2001").await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_upload_keeps_state_and_is_retryable() {
    let clock = Arc::new(ManualClock::new(t0()));
    let uploader = Arc::new(MemoryPhotoUploader::new(clock.clone()));
    let service = service_with(clock, uploader.clone(), Duration::from_secs(1));
    service.assign("T-1", "Sweep lobby").await.unwrap();
    service.start("T-1").await.unwrap();

    uploader.fail_next(1);
    let err = service
        .upload_before_photo("T-1", vec![1])
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(
        service.snapshot("T-1").await.unwrap().state,
        TaskState::InProgress
    );

    let view = assert_ok!(service.upload_before_photo("T-1", vec![1]).await);
    assert_eq!(view.state, TaskState::BeforeUploaded);
}

#[tokio::test]
async fn upload_outside_window_rejected_before_dispatch() {
    let clock = Arc::new(ManualClock::new(t0()));
    let uploader = Arc::new(MemoryPhotoUploader::new(clock.clone()));
    let service = service_with(clock, uploader.clone(), Duration::from_secs(1));
    service.assign("T-1", "Sweep lobby").await.unwrap();

    let err = service.upload_after_photo("T-1", vec![1]).await.unwrap_err();
    assert!(matches!(
        err,
        TaskError::InvalidTransition {
            state: TaskState::Assigned,
            intent: IntentKind::UploadAfterPhoto,
            ..
        }
    ));
    assert_eq!(uploader.upload_count(), 0);
}

#[tokio::test]
async fn intents_and_ticks_publish_views() {
    let clock = Arc::new(ManualClock::new(t0()));
    let uploader = Arc::new(MemoryPhotoUploader::new(clock.clone()));
    let service = service_with(clock.clone(), uploader, Duration::from_secs(1));
    service.assign("T-1", "Sweep lobby").await.unwrap();

    let mut rx = service.subscribe();
    service.start("T-1").await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update()[0].state, TaskState::InProgress);

    clock.advance(chrono::Duration::seconds(300));
    let report = service.tick_now().await;
    assert_eq!(report.escalated.len(), 1);
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update()[0].state, TaskState::Escalated);
}

#[tokio::test]
async fn upload_completing_after_escalation_is_stale() {
    let clock = Arc::new(ManualClock::new(t0()));
    let uploader = Arc::new(GatedUploader {
        clock: clock.clone(),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let service = Arc::new(service_with(
        clock.clone(),
        uploader.clone(),
        Duration::from_secs(1),
    ));
    service.assign("T-1", "Sweep lobby").await.unwrap();
    service.start("T-1").await.unwrap();

    let in_flight = {
        let service = service.clone();
        tokio::spawn(async move { service.upload_before_photo("T-1", vec![1]).await })
    };
    uploader.entered.notified().await;

    clock.advance(chrono::Duration::seconds(301));
    let report = service.tick_now().await;
    assert_eq!(report.escalated.len(), 1);

    uploader.release.notify_one();
    let err = in_flight.await.unwrap().unwrap_err();
    assert_eq!(
        err,
        TaskError::StaleUploadResult {
            task_id: TaskId::new("T-1"),
            slot: PhotoSlot::Before,
            state: TaskState::Escalated,
        }
    );

    let task = service.snapshot("T-1").await.unwrap();
    assert_eq!(task.state, TaskState::Escalated);
    assert!(task.before_photo.is_none());
}

#[tokio::test]
async fn background_ticker_escalates_and_shuts_down() {
    let clock = Arc::new(ManualClock::new(t0()));
    let uploader = Arc::new(MemoryPhotoUploader::new(clock.clone()));
    let mut service = service_with(clock.clone(), uploader, Duration::from_millis(10));
    service.assign("T-1", "Sweep lobby").await.unwrap();
    service.start("T-1").await.unwrap();

    let mut rx = service.subscribe();
    clock.advance(chrono::Duration::seconds(305));
    assert_ok!(service.spawn_ticker());

    let escalated = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if rx.borrow_and_update()[0].state == TaskState::Escalated {
                break;
            }
            rx.changed().await.unwrap();
        }
    })
    .await;
    assert!(escalated.is_ok(), "ticker never escalated the task");

    assert_ok!(service.shutdown_and_wait().await);
    assert!(service.shutdown_token().is_cancelled());
}

#[tokio::test]
async fn from_config_seeds_tasks() {
    let config = RunnerConfig::from_yaml_str(include_str!("../configs/demo.yaml")).unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let service = TaskService::from_config(&config, clock).unwrap();

    let views = service.views().await;
    let ids: Vec<_> = views.iter().map(|view| view.id.as_str()).collect();
    assert_eq!(ids, vec!["T-2001", "T-2002"]);
    assert!(views.iter().all(|view| view.state == TaskState::Assigned));
}

#[tokio::test]
async fn zero_tick_period_is_rejected_before_spawning() {
    let clock = Arc::new(ManualClock::new(t0()));
    let uploader = Arc::new(MemoryPhotoUploader::new(clock.clone()));
    let mut service = service_with(clock, uploader, Duration::ZERO);

    let err = service.spawn_ticker().unwrap_err();
    assert!(err.to_string().contains("ticker period"));
    assert_ok!(service.shutdown_and_wait().await);
}

#[tokio::test]
async fn from_config_applies_window_settings() {
    let yaml = "engine:\n  before_window_secs: 60\ntasks:\n  - id: T-1\n    title: Sweep lobby\n";
    let config = RunnerConfig::from_yaml_str(yaml).unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let service = TaskService::from_config(&config, clock.clone()).unwrap();

    service.start("T-1").await.unwrap();
    clock.advance(chrono::Duration::seconds(59));
    assert!(service.tick_now().await.escalated.is_empty());
    clock.advance(chrono::Duration::seconds(1));
    assert_eq!(service.tick_now().await.escalated.len(), 1);
}
