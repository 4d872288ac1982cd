/*
[INPUT]:  Task anchor timestamps (accepted_at, marked_complete_at), current time, window sizes
[OUTPUT]: Elapsed/remaining/percent per photo window and countdown strings
[POS]:    Domain logic - time-box computation behind escalation and progress display
[UPDATE]: When window semantics or display clamping change
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Task;

/// Default length of both photo windows: five minutes.
pub const DEFAULT_WINDOW_SECS: u32 = 5 * 60;

/// Lengths of the before-photo and after-photo time-boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "default_window_secs")]
    pub before_window_secs: u32,
    #[serde(default = "default_window_secs")]
    pub after_window_secs: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            before_window_secs: DEFAULT_WINDOW_SECS,
            after_window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

fn default_window_secs() -> u32 {
    DEFAULT_WINDOW_SECS
}

/// Snapshot of one time-box measured at a given instant.
///
/// `remaining_secs` is the raw value used for the escalation comparison and
/// may be negative; use [`WindowTimer::display_remaining`] for presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowTimer {
    pub window_secs: u32,
    pub elapsed_secs: i64,
    pub remaining_secs: i64,
    pub percent: f64,
    pub anchored: bool,
}

impl WindowTimer {
    /// Measure a window anchored at `anchor`. An absent anchor reports the
    /// full window remaining and never expires.
    pub fn measure(anchor: Option<DateTime<Utc>>, now: DateTime<Utc>, window_secs: u32) -> Self {
        let window = i64::from(window_secs);
        let Some(anchor) = anchor else {
            return Self {
                window_secs,
                elapsed_secs: 0,
                remaining_secs: window,
                percent: 0.0,
                anchored: false,
            };
        };

        let elapsed = elapsed_seconds(anchor, now);
        let percent = if window == 0 {
            100.0
        } else {
            (elapsed as f64 / window as f64 * 100.0).clamp(0.0, 100.0)
        };

        Self {
            window_secs,
            elapsed_secs: elapsed,
            remaining_secs: window - elapsed,
            percent,
            anchored: true,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.anchored && self.remaining_secs <= 0
    }

    pub fn display_remaining(&self) -> u64 {
        self.remaining_secs.max(0) as u64
    }
}

/// Both windows of a task measured at the same instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskTimers {
    pub before: WindowTimer,
    pub after: WindowTimer,
}

impl TaskTimers {
    pub fn measure(task: &Task, now: DateTime<Utc>, settings: &WindowSettings) -> Self {
        Self {
            before: WindowTimer::measure(task.accepted_at, now, settings.before_window_secs),
            after: WindowTimer::measure(task.marked_complete_at, now, settings.after_window_secs),
        }
    }

    /// True when the window that governs the task's current state has run out.
    pub fn deadline_missed(&self, task: &Task) -> bool {
        if task.state.in_before_window() {
            return self.before.is_expired();
        }
        if task.state.in_after_window() {
            return self.after.is_expired();
        }
        false
    }
}

/// Whole seconds between `anchor` and `now`, floored.
pub fn elapsed_seconds(anchor: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - anchor).num_milliseconds().div_euclid(1000)
}

/// `mm:ss` countdown; negative values render as `00:00`.
pub fn format_countdown(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
