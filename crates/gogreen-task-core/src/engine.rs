/*
[INPUT]:  Assignments, user intents, clock ticks, upload outcomes, injected Clock
[OUTPUT]: Authoritative task collection, transitions, TaskView projections, summary counts
[POS]:    Core engine - owns every Task and is the only place they change
[UPDATE]: When intent handling, tick evaluation or upload reaction changes
*/

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, trace, warn};

use crate::clock::Clock;
use crate::error::{Result, TaskError, UploadError};
use crate::state_machine::{Intent, IntentKind, Transition, apply_intent, escalate_if_overdue};
use crate::timer::{TaskTimers, WindowSettings};
use crate::types::{PhotoRecord, PhotoSlot, Task, TaskId, TaskState, TaskSummary, TaskView};

/// Outcome of one tick pass over the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub at: DateTime<Utc>,
    /// Non-terminal tasks whose timers were checked.
    pub evaluated: usize,
    pub escalated: Vec<Transition>,
}

/// In-memory lifecycle engine for a collection of independent tasks.
pub struct TaskLifecycleEngine {
    tasks: BTreeMap<TaskId, Task>,
    windows: WindowSettings,
    clock: Arc<dyn Clock>,
}

impl TaskLifecycleEngine {
    /// Engine with the default five-minute windows.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_windows(clock, WindowSettings::default())
    }

    pub fn with_windows(clock: Arc<dyn Clock>, windows: WindowSettings) -> Self {
        Self {
            tasks: BTreeMap::new(),
            windows,
            clock,
        }
    }

    pub fn windows(&self) -> WindowSettings {
        self.windows
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Register a new task in `ASSIGNED`.
    pub fn assign(&mut self, id: impl Into<TaskId>, title: impl Into<String>) -> Result<TaskView> {
        let task = Task::assigned(id, title);
        if self.tasks.contains_key(&task.id) {
            return Err(TaskError::DuplicateTask { task_id: task.id });
        }

        info!(task_id = %task.id, title = %task.title, "task assigned");
        let view = self.project(&task, self.clock.now());
        self.tasks.insert(task.id.clone(), task);
        Ok(view)
    }

    /// Apply one intent at the clock's current time.
    pub fn apply(&mut self, task_id: &str, intent: Intent) -> Result<TaskView> {
        let now = self.clock.now();
        let windows = self.windows;
        let task = self.task_mut(task_id)?;

        match apply_intent(task, intent, now) {
            Ok(transition) => {
                log_transition(&transition);
                let timers = TaskTimers::measure(task, now, &windows);
                Ok(TaskView::project(task, &timers))
            }
            Err(err) => {
                debug!(task_id, error = %err, "intent rejected");
                Err(err)
            }
        }
    }

    pub fn start(&mut self, task_id: &str) -> Result<TaskView> {
        self.apply(task_id, Intent::Start)
    }

    pub fn upload_before_photo(&mut self, task_id: &str, photo: PhotoRecord) -> Result<TaskView> {
        self.apply(task_id, Intent::UploadBeforePhoto(photo))
    }

    pub fn mark_complete(&mut self, task_id: &str) -> Result<TaskView> {
        self.apply(task_id, Intent::MarkComplete)
    }

    pub fn upload_after_photo(&mut self, task_id: &str, photo: PhotoRecord) -> Result<TaskView> {
        self.apply(task_id, Intent::UploadAfterPhoto(photo))
    }

    /// Check that an upload for `slot` may be started now.
    ///
    /// The task is not changed and its window keeps running while the upload
    /// is in flight; `complete_upload` re-checks the state on arrival.
    pub fn begin_upload(&self, task_id: &str, slot: PhotoSlot) -> Result<()> {
        let task = self.task_ref(task_id)?;
        if !slot.accepts_upload_in(task.state) {
            return Err(TaskError::InvalidTransition {
                task_id: task.id.clone(),
                state: task.state,
                intent: IntentKind::upload(slot),
            });
        }
        debug!(task_id, %slot, state = %task.state, "upload started");
        Ok(())
    }

    /// React to the uploader's outcome for `slot`.
    ///
    /// A failure leaves the task untouched. A result for a task that has since
    /// left the uploadable state is discarded as stale.
    pub fn complete_upload(
        &mut self,
        task_id: &str,
        slot: PhotoSlot,
        outcome: std::result::Result<PhotoRecord, UploadError>,
    ) -> Result<TaskView> {
        let task = self.task_ref(task_id)?;
        let task_id_owned = task.id.clone();
        let state = task.state;

        let photo = match outcome {
            Ok(photo) => photo,
            Err(source) => {
                warn!(task_id, %slot, error = %source, "photo upload failed");
                return Err(TaskError::UploadFailed {
                    task_id: task_id_owned,
                    slot,
                    source,
                });
            }
        };

        if !slot.accepts_upload_in(state) {
            warn!(task_id, %slot, %state, url = %photo.url, "discarding stale upload result");
            return Err(TaskError::StaleUploadResult {
                task_id: task_id_owned,
                slot,
                state,
            });
        }

        self.apply(task_id, Intent::for_upload(slot, photo))
    }

    /// Re-evaluate every non-terminal task against `now`.
    ///
    /// Elapsed time is always recomputed from the stored anchors, so late or
    /// skipped ticks do not drift.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickReport {
        let windows = self.windows;
        let mut evaluated = 0;
        let mut escalated = Vec::new();

        for task in self.tasks.values_mut() {
            if task.state.is_terminal() {
                continue;
            }
            evaluated += 1;

            let timers = TaskTimers::measure(task, now, &windows);
            if let Some(transition) = escalate_if_overdue(task, &timers, now) {
                log_transition(&transition);
                escalated.push(transition);
            }
        }

        trace!(evaluated, escalated = escalated.len(), "tick evaluated");
        TickReport {
            at: now,
            evaluated,
            escalated,
        }
    }

    /// Read-only copy of a task.
    pub fn snapshot(&self, task_id: &str) -> Result<Task> {
        self.task_ref(task_id).cloned()
    }

    pub fn view(&self, task_id: &str) -> Result<TaskView> {
        let task = self.task_ref(task_id)?;
        Ok(self.project(task, self.clock.now()))
    }

    pub fn views(&self) -> Vec<TaskView> {
        self.views_at(self.clock.now())
    }

    pub fn views_at(&self, now: DateTime<Utc>) -> Vec<TaskView> {
        self.tasks
            .values()
            .map(|task| self.project(task, now))
            .collect()
    }

    pub fn summary(&self) -> TaskSummary {
        TaskSummary::from_states(self.tasks.values().map(|task| task.state))
    }

    fn project(&self, task: &Task, now: DateTime<Utc>) -> TaskView {
        let timers = TaskTimers::measure(task, now, &self.windows);
        TaskView::project(task, &timers)
    }

    fn task_ref(&self, task_id: &str) -> Result<&Task> {
        self.tasks.get(task_id).ok_or_else(|| TaskError::UnknownTask {
            task_id: TaskId::new(task_id),
        })
    }

    fn task_mut(&mut self, task_id: &str) -> Result<&mut Task> {
        self.tasks
            .get_mut(task_id)
            .ok_or_else(|| TaskError::UnknownTask {
                task_id: TaskId::new(task_id),
            })
    }
}

fn log_transition(transition: &Transition) {
    if transition.to == TaskState::Escalated {
        warn!(
            task_id = %transition.task_id,
            from = %transition.from,
            cause = ?transition.cause,
            "task escalated: deadline missed"
        );
    } else {
        info!(
            task_id = %transition.task_id,
            from = %transition.from,
            to = %transition.to,
            via = ?transition.via,
            "task transitioned"
        );
    }
}
