/*
[INPUT]:  Task records and timer measurements
[OUTPUT]: Read-only projections for presentation (per-task view, collection summary)
[POS]:    Data layer - outbound shape consumed by dashboards
[UPDATE]: When presentation needs new derived fields
*/

use serde::{Deserialize, Serialize};

use super::state::TaskState;
use super::task::{PhotoRecord, Task, TaskId};
use crate::timer::TaskTimers;

/// Per-task projection recomputed on every tick and after every intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: TaskId,
    pub title: String,
    pub state: TaskState,
    pub before_photo: Option<PhotoRecord>,
    pub after_photo: Option<PhotoRecord>,
    pub before_remaining_seconds: u64,
    pub before_percent: f64,
    pub after_remaining_seconds: u64,
    pub after_percent: f64,
}

impl TaskView {
    pub fn project(task: &Task, timers: &TaskTimers) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            state: task.state,
            before_photo: task.before_photo.clone(),
            after_photo: task.after_photo.clone(),
            before_remaining_seconds: timers.before.display_remaining(),
            before_percent: timers.before.percent,
            after_remaining_seconds: timers.after.display_remaining(),
            after_percent: timers.after.percent,
        }
    }
}

/// Headline counts shown above the task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub total: usize,
    pub pending: usize,
    pub active: usize,
    pub done: usize,
    pub escalated: usize,
}

impl TaskSummary {
    pub fn from_states(states: impl IntoIterator<Item = TaskState>) -> Self {
        let mut summary = Self::default();
        for state in states {
            summary.total += 1;
            match state {
                TaskState::Assigned => summary.pending += 1,
                TaskState::InProgress | TaskState::BeforeUploaded | TaskState::MarkedComplete => {
                    summary.active += 1
                }
                TaskState::Completed => summary.done += 1,
                TaskState::Escalated => summary.escalated += 1,
                TaskState::AfterUploaded => {}
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let summary = TaskSummary::from_states([
            TaskState::Assigned,
            TaskState::Assigned,
            TaskState::InProgress,
            TaskState::MarkedComplete,
            TaskState::Completed,
            TaskState::Escalated,
        ]);
        assert_eq!(
            summary,
            TaskSummary {
                total: 6,
                pending: 2,
                active: 2,
                done: 1,
                escalated: 1,
            }
        );
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(TaskSummary::from_states([]), TaskSummary::default());
    }
}
