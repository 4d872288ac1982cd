/*
[INPUT]:  Rejected intents, missing tasks, uploader failures, late upload results
[OUTPUT]: Typed errors with retry hints and user-facing messages
[POS]:    Error handling layer - unified error types for the lifecycle engine
[UPDATE]: When adding new failure modes or changing user messaging
*/

use thiserror::Error;

use crate::state_machine::IntentKind;
use crate::types::{PhotoSlot, TaskId, TaskState};

/// Failure reported by the photo upload collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Nothing to upload
    #[error("photo payload is empty")]
    EmptyPayload,

    /// Storage refused the object
    #[error("upload rejected: {0}")]
    Rejected(String),

    /// Storage did not answer in time
    #[error("upload timed out after {0}ms")]
    Timeout(u64),
}

/// Main error type for lifecycle operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    /// Intent is not allowed from the task's current state
    #[error("invalid transition for task {task_id}: {intent} not allowed in {state}")]
    InvalidTransition {
        task_id: TaskId,
        state: TaskState,
        intent: IntentKind,
    },

    /// No task with this id
    #[error("unknown task: {task_id}")]
    UnknownTask { task_id: TaskId },

    /// Assignment reused an existing id
    #[error("task already exists: {task_id}")]
    DuplicateTask { task_id: TaskId },

    /// The uploader reported failure; task state is unchanged
    #[error("{slot} photo upload failed for task {task_id}: {source}")]
    UploadFailed {
        task_id: TaskId,
        slot: PhotoSlot,
        #[source]
        source: UploadError,
    },

    /// Upload finished after the task left the state it was valid in
    #[error("discarded stale {slot} photo for task {task_id} (now {state})")]
    StaleUploadResult {
        task_id: TaskId,
        slot: PhotoSlot,
        state: TaskState,
    },
}

impl TaskError {
    /// Only a failed upload is worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskError::UploadFailed { .. })
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, TaskError::StaleUploadResult { .. })
    }

    pub fn task_id(&self) -> &TaskId {
        match self {
            TaskError::InvalidTransition { task_id, .. }
            | TaskError::UnknownTask { task_id }
            | TaskError::DuplicateTask { task_id }
            | TaskError::UploadFailed { task_id, .. }
            | TaskError::StaleUploadResult { task_id, .. } => task_id,
        }
    }

    /// Short message for the worker's screen.
    pub fn user_message(&self) -> &'static str {
        match self {
            TaskError::InvalidTransition { .. } => "Not allowed right now.",
            TaskError::UnknownTask { .. } => "Task not found.",
            TaskError::DuplicateTask { .. } => "A task with this id already exists.",
            TaskError::UploadFailed { .. } => "Upload failed, please retry.",
            TaskError::StaleUploadResult { .. } => {
                "Upload arrived too late; the task has moved on."
            }
        }
    }
}

/// Result type alias for lifecycle operations
pub type Result<T> = std::result::Result<T, TaskError>;
