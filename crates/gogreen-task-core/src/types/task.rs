/*
[INPUT]:  Assignment data (id, title) and photo upload descriptors
[OUTPUT]: Task record mutated by the lifecycle engine
[POS]:    Data layer - unit of assigned field work
[UPDATE]: When task attributes or id format change
*/

use std::borrow::Borrow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::{PhotoSlot, TaskState};

/// Opaque task identifier, stable for the task's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id for ad-hoc assignments, e.g. `T-3f2a9c1e`.
    pub fn generate() -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self(format!("T-{}", &uuid[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for TaskId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Stored-object descriptor returned by the photo uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl PhotoRecord {
    pub fn new(url: impl Into<String>, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            url: url.into(),
            uploaded_at,
        }
    }
}

/// One unit of assigned field work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub state: TaskState,
    pub accepted_at: Option<DateTime<Utc>>,
    pub marked_complete_at: Option<DateTime<Utc>>,
    pub before_photo: Option<PhotoRecord>,
    pub after_photo: Option<PhotoRecord>,
}

impl Task {
    /// New task in `ASSIGNED` with no anchors or photos.
    pub fn assigned(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            state: TaskState::Assigned,
            accepted_at: None,
            marked_complete_at: None,
            before_photo: None,
            after_photo: None,
        }
    }

    pub fn photo(&self, slot: PhotoSlot) -> Option<&PhotoRecord> {
        match slot {
            PhotoSlot::Before => self.before_photo.as_ref(),
            PhotoSlot::After => self.after_photo.as_ref(),
        }
    }
}
