/*
[INPUT]:  Test scenarios needing a deterministic clock and seeded tasks
[OUTPUT]: Shared fixtures for lifecycle integration tests
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for gogreen-task-core tests

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use gogreen_task_core::{ManualClock, PhotoRecord, Task, TaskLifecycleEngine, TaskState};

/// Fixed origin for simulated time
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

pub fn at(seconds: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(seconds)
}

/// Engine on a manual clock at t0
#[allow(dead_code)]
pub fn engine_with_clock() -> (Arc<ManualClock>, TaskLifecycleEngine) {
    let clock = Arc::new(ManualClock::new(t0()));
    let engine = TaskLifecycleEngine::new(clock.clone());
    (clock, engine)
}

pub fn photo(name: &str, uploaded_at: DateTime<Utc>) -> PhotoRecord {
    PhotoRecord::new(format!("memory://photos/{name}"), uploaded_at)
}

/// Task placed directly in `state` with the fields that state implies
#[allow(dead_code)]
pub fn task_in(state: TaskState) -> Task {
    let mut task = Task::assigned("T-1", "Clear Block A3 drain");
    task.state = state;
    if state != TaskState::Assigned {
        task.accepted_at = Some(t0());
    }
    if matches!(
        state,
        TaskState::BeforeUploaded
            | TaskState::MarkedComplete
            | TaskState::AfterUploaded
            | TaskState::Completed
    ) {
        task.before_photo = Some(photo("before", at(10)));
    }
    if matches!(
        state,
        TaskState::MarkedComplete | TaskState::AfterUploaded | TaskState::Completed
    ) {
        task.marked_complete_at = Some(at(20));
    }
    if matches!(state, TaskState::AfterUploaded | TaskState::Completed) {
        task.after_photo = Some(photo("after", at(25)));
    }
    task
}
