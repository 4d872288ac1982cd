/*
[INPUT]:  Task record, Intent (closed set of user requests), current time, window timers
[OUTPUT]: Validated state transitions or InvalidTransition errors
[POS]:    Task domain logic - state machine for the photo-gated lifecycle
[UPDATE]: When lifecycle edges, intent payloads or escalation rules change
*/

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskError};
use crate::timer::TaskTimers;
use crate::types::{PhotoRecord, PhotoSlot, Task, TaskId, TaskState};

/// User requests that advance a task, each with its fixed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Start,
    UploadBeforePhoto(PhotoRecord),
    MarkComplete,
    UploadAfterPhoto(PhotoRecord),
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::Start => IntentKind::Start,
            Intent::UploadBeforePhoto(_) => IntentKind::UploadBeforePhoto,
            Intent::MarkComplete => IntentKind::MarkComplete,
            Intent::UploadAfterPhoto(_) => IntentKind::UploadAfterPhoto,
        }
    }

    /// Intent that stores an uploaded photo in `slot`.
    pub fn for_upload(slot: PhotoSlot, photo: PhotoRecord) -> Self {
        match slot {
            PhotoSlot::Before => Intent::UploadBeforePhoto(photo),
            PhotoSlot::After => Intent::UploadAfterPhoto(photo),
        }
    }
}

/// Payload-free tag of an [`Intent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Start,
    UploadBeforePhoto,
    MarkComplete,
    UploadAfterPhoto,
}

impl IntentKind {
    pub const ALL: [IntentKind; 4] = [
        IntentKind::Start,
        IntentKind::UploadBeforePhoto,
        IntentKind::MarkComplete,
        IntentKind::UploadAfterPhoto,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IntentKind::Start => "start",
            IntentKind::UploadBeforePhoto => "upload_before_photo",
            IntentKind::MarkComplete => "mark_complete",
            IntentKind::UploadAfterPhoto => "upload_after_photo",
        }
    }

    pub fn upload(slot: PhotoSlot) -> Self {
        match slot {
            PhotoSlot::Before => IntentKind::UploadBeforePhoto,
            PhotoSlot::After => IntentKind::UploadAfterPhoto,
        }
    }

    pub fn upload_slot(self) -> Option<PhotoSlot> {
        match self {
            IntentKind::UploadBeforePhoto => Some(PhotoSlot::Before),
            IntentKind::UploadAfterPhoto => Some(PhotoSlot::After),
            IntentKind::Start | IntentKind::MarkComplete => None,
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What caused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    Intent(IntentKind),
    DeadlineMissed(PhotoSlot),
}

/// Record of one applied transition.
///
/// `via` names an intermediate state the task passed through inside the same
/// call (the after-photo upload goes through `AFTER_UPLOADED`); it is never
/// visible in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub task_id: TaskId,
    pub from: TaskState,
    pub to: TaskState,
    pub via: Option<TaskState>,
    pub cause: TransitionCause,
    pub at: DateTime<Utc>,
}

/// Check whether `kind` may be applied to `task` as it stands.
pub fn can_apply(task: &Task, kind: IntentKind) -> bool {
    match (task.state, kind) {
        (TaskState::Assigned, IntentKind::Start) => true,
        (TaskState::InProgress | TaskState::BeforeUploaded, IntentKind::UploadBeforePhoto) => true,
        (TaskState::BeforeUploaded, IntentKind::MarkComplete) => task.before_photo.is_some(),
        (TaskState::MarkedComplete, IntentKind::UploadAfterPhoto) => true,
        _ => false,
    }
}

/// Intents the worker may currently issue, in display order.
pub fn allowed_intents(task: &Task) -> Vec<IntentKind> {
    IntentKind::ALL
        .into_iter()
        .filter(|kind| can_apply(task, *kind))
        .collect()
}

/// Apply an intent, mutating the task only when the transition is valid.
pub fn apply_intent(task: &mut Task, intent: Intent, now: DateTime<Utc>) -> Result<Transition> {
    let kind = intent.kind();
    if !can_apply(task, kind) {
        return Err(TaskError::InvalidTransition {
            task_id: task.id.clone(),
            state: task.state,
            intent: kind,
        });
    }

    let from = task.state;
    let via = match intent {
        Intent::Start => {
            task.accepted_at = Some(now);
            task.state = TaskState::InProgress;
            None
        }
        Intent::UploadBeforePhoto(photo) => {
            task.before_photo = Some(photo);
            task.state = TaskState::BeforeUploaded;
            None
        }
        Intent::MarkComplete => {
            task.marked_complete_at = Some(now);
            task.state = TaskState::MarkedComplete;
            None
        }
        Intent::UploadAfterPhoto(photo) => {
            task.after_photo = Some(photo);
            task.state = TaskState::Completed;
            Some(TaskState::AfterUploaded)
        }
    };

    Ok(Transition {
        task_id: task.id.clone(),
        from,
        to: task.state,
        via,
        cause: TransitionCause::Intent(kind),
        at: now,
    })
}

/// Force `ESCALATED` when the window governing the current state has run out.
pub fn escalate_if_overdue(
    task: &mut Task,
    timers: &TaskTimers,
    now: DateTime<Utc>,
) -> Option<Transition> {
    if task.state.is_terminal() || !timers.deadline_missed(task) {
        return None;
    }

    let slot = if task.state.in_before_window() {
        PhotoSlot::Before
    } else {
        PhotoSlot::After
    };
    let from = task.state;
    task.state = TaskState::Escalated;

    Some(Transition {
        task_id: task.id.clone(),
        from,
        to: TaskState::Escalated,
        via: None,
        cause: TransitionCause::DeadlineMissed(slot),
        at: now,
    })
}
