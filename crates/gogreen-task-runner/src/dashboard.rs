/*
[INPUT]:  TaskView projections and TaskSummary counts
[OUTPUT]: Plain-text dashboard with state badges, countdowns and photo links
[POS]:    Presentation layer - terminal rendering for headless and interactive modes
[UPDATE]: When view fields or badge colours change
*/

use std::fmt::Write as _;

use console::{Style, style};
use gogreen_task_core::{TaskState, TaskSummary, TaskView, format_countdown};

const BAR_WIDTH: usize = 20;

pub fn state_style(state: TaskState) -> Style {
    match state {
        TaskState::Assigned => Style::new().blue(),
        TaskState::InProgress => Style::new().color256(208),
        TaskState::BeforeUploaded => Style::new().magenta(),
        TaskState::MarkedComplete => Style::new().yellow(),
        TaskState::AfterUploaded => Style::new().color256(63),
        TaskState::Completed => Style::new().green(),
        TaskState::Escalated => Style::new().red().bold(),
    }
}

/// Render the full dashboard. Colours follow `console`'s global switch.
pub fn render_dashboard(views: &[TaskView], summary: &TaskSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  total {}  pending {}  active {}  done {}  escalated {}",
        style("Tasks").bold(),
        summary.total,
        summary.pending,
        summary.active,
        summary.done,
        summary.escalated,
    );

    if views.is_empty() {
        let _ = writeln!(out, "{}", style("No tasks assigned").dim());
        return out;
    }

    for view in views {
        render_task(&mut out, view);
    }
    out
}

fn render_task(out: &mut String, view: &TaskView) {
    let badge = state_style(view.state).apply_to(format!("[{}]", view.state.label()));
    let _ = writeln!(out, "{} {} {}", style(view.id.as_str()).bold(), view.title, badge);

    if view.state.in_before_window() {
        let _ = writeln!(
            out,
            "    before photo  {} {}",
            progress_bar(view.before_percent),
            format_countdown(view.before_remaining_seconds as i64),
        );
    } else if view.state.in_after_window() {
        let _ = writeln!(
            out,
            "    after photo   {} {}",
            progress_bar(view.after_percent),
            format_countdown(view.after_remaining_seconds as i64),
        );
    }

    if let Some(photo) = &view.before_photo {
        let _ = writeln!(out, "    before: {}", photo.url);
    }
    if let Some(photo) = &view.after_photo {
        let _ = writeln!(out, "    after:  {}", photo.url);
    }

    match view.state {
        TaskState::Completed => {
            let _ = writeln!(out, "    {}", style("Task completed").green());
        }
        TaskState::Escalated => {
            let _ = writeln!(out, "    {}", style("Escalated: photo deadline missed").red());
        }
        _ => {}
    }
}

fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
