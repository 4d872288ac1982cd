/*
[INPUT]:  Lifecycle states of an employee task and the photo slots it fills
[OUTPUT]: Typed enums with serde names matching the dashboard state strings
[POS]:    Data layer - lifecycle vocabulary shared by engine and presentation
[UPDATE]: When lifecycle states or photo slots change
*/

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a task, in normal-flow order followed by `Escalated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Assigned,
    InProgress,
    BeforeUploaded,
    MarkedComplete,
    AfterUploaded,
    Completed,
    Escalated,
}

impl TaskState {
    pub const ALL: [TaskState; 7] = [
        TaskState::Assigned,
        TaskState::InProgress,
        TaskState::BeforeUploaded,
        TaskState::MarkedComplete,
        TaskState::AfterUploaded,
        TaskState::Completed,
        TaskState::Escalated,
    ];

    /// Returns true for states that accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Escalated)
    }

    /// States in which the before-photo window is running.
    pub fn in_before_window(self) -> bool {
        matches!(self, TaskState::InProgress | TaskState::BeforeUploaded)
    }

    /// State in which the after-photo window is running.
    pub fn in_after_window(self) -> bool {
        self == TaskState::MarkedComplete
    }

    /// Worker is on the job: accepted but neither finished nor escalated.
    pub fn is_active(self) -> bool {
        self.in_before_window() || self.in_after_window()
    }

    /// Wire name, e.g. `IN_PROGRESS`.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Assigned => "ASSIGNED",
            TaskState::InProgress => "IN_PROGRESS",
            TaskState::BeforeUploaded => "BEFORE_UPLOADED",
            TaskState::MarkedComplete => "MARKED_COMPLETE",
            TaskState::AfterUploaded => "AFTER_UPLOADED",
            TaskState::Completed => "COMPLETED",
            TaskState::Escalated => "ESCALATED",
        }
    }

    /// Human-readable badge text, e.g. `IN PROGRESS`.
    pub fn label(self) -> &'static str {
        match self {
            TaskState::Assigned => "ASSIGNED",
            TaskState::InProgress => "IN PROGRESS",
            TaskState::BeforeUploaded => "BEFORE UPLOADED",
            TaskState::MarkedComplete => "MARKED COMPLETE",
            TaskState::AfterUploaded => "AFTER UPLOADED",
            TaskState::Completed => "COMPLETED",
            TaskState::Escalated => "ESCALATED",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which photo an upload fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSlot {
    Before,
    After,
}

impl PhotoSlot {
    /// States in which an upload for this slot may be started or applied.
    pub fn accepts_upload_in(self, state: TaskState) -> bool {
        match self {
            PhotoSlot::Before => state.in_before_window(),
            PhotoSlot::After => state == TaskState::MarkedComplete,
        }
    }
}

impl fmt::Display for PhotoSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoSlot::Before => f.write_str("before"),
            PhotoSlot::After => f.write_str("after"),
        }
    }
}
