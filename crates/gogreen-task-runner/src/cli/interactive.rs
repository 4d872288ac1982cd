/*
[INPUT]:  Running TaskService and user input via CLI menus
[OUTPUT]: Intents applied to tasks, dashboard printed on demand
[POS]:    CLI interactive flow
[UPDATE]: When the set of worker actions or their prompts change
*/

use anyhow::Result;
use console::style;
use dialoguer::{Input, Select, theme::ColorfulTheme};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use gogreen_task_core::{IntentKind, PhotoSlot, TaskError, TaskId, TaskView};
use gogreen_task_runner::{TaskService, render_dashboard};

/// Menu loop; returns once the user exits or `shutdown` is cancelled.
pub async fn run_interactive(service: &TaskService, shutdown: &CancellationToken) -> Result<()> {
    let theme = ColorfulTheme::default();
    println!("{}", style("GoGreen Employee Tasks").bold().green());

    loop {
        // Ticks stop once the token is cancelled.
        if shutdown.is_cancelled() {
            info!("shutdown requested; leaving interactive session");
            return Ok(());
        }

        let actions = vec!["Show dashboard", "Work on a task", "Assign a task", "Exit"];
        let selection = Select::with_theme(&theme)
            .with_prompt("Select action")
            .items(&actions)
            .default(0)
            .interact()?;

        match selection {
            0 => show_dashboard(service).await,
            1 => work_on_task(service, &theme).await?,
            2 => assign_task(service, &theme).await?,
            _ => return Ok(()),
        }
    }
}

async fn show_dashboard(service: &TaskService) {
    let views = service.views().await;
    let summary = service.summary().await;
    println!("{}", render_dashboard(&views, &summary));
}

async fn work_on_task(service: &TaskService, theme: &ColorfulTheme) -> Result<()> {
    let views = service.views().await;
    if views.is_empty() {
        println!("{}", style("No tasks assigned.").yellow());
        return Ok(());
    }

    let Some(task) = select_task(&views, theme)? else {
        return Ok(());
    };

    let intents = match service.allowed_intents(task.id.as_str()).await {
        Ok(intents) => intents,
        Err(err) => {
            report_error(&err);
            return Ok(());
        }
    };
    if intents.is_empty() {
        println!(
            "{}",
            style(format!("{} is {}; nothing to do.", task.id, task.state.label())).yellow()
        );
        return Ok(());
    }

    let labels: Vec<&str> = intents.iter().map(|intent| action_label(*intent)).collect();
    let choice = Select::with_theme(theme)
        .with_prompt(format!("Action for {}", task.id))
        .items(&labels)
        .default(0)
        .interact()?;
    let intent = intents[choice];

    let result = match intent.upload_slot() {
        Some(slot) => {
            let path = prompt_photo_path(slot, theme)?;
            let payload = match load_photo(&path).await {
                Ok(payload) => payload,
                Err(message) => {
                    println!("{}", style(message).red());
                    return Ok(());
                }
            };
            match slot {
                PhotoSlot::Before => service.upload_before_photo(task.id.as_str(), payload).await,
                PhotoSlot::After => service.upload_after_photo(task.id.as_str(), payload).await,
            }
        }
        None if intent == IntentKind::Start => service.start(task.id.as_str()).await,
        None => service.mark_complete(task.id.as_str()).await,
    };

    match result {
        Ok(view) => println!(
            "{} {} is now {}",
            style("OK").bold().green(),
            view.id,
            view.state.label()
        ),
        Err(err) => report_error(&err),
    }
    Ok(())
}

fn select_task<'a>(views: &'a [TaskView], theme: &ColorfulTheme) -> Result<Option<&'a TaskView>> {
    let items: Vec<String> = views
        .iter()
        .map(|view| format!("{} | {} | {}", view.id, view.title, view.state.label()))
        .collect();

    let selection = Select::with_theme(theme)
        .with_prompt("Select task")
        .items(&items)
        .default(0)
        .interact_opt()?;
    Ok(selection.map(|idx| &views[idx]))
}

fn prompt_photo_path(slot: PhotoSlot, theme: &ColorfulTheme) -> Result<String> {
    let path: String = Input::with_theme(theme)
        .with_prompt(format!("Path to {slot} photo"))
        .interact_text()?;
    Ok(path.trim().to_string())
}

/// Read photo bytes, or a retry message for the worker's screen.
async fn load_photo(path: &str) -> std::result::Result<Vec<u8>, String> {
    tokio::fs::read(path).await.map_err(|err| {
        warn!(path, error = %err, "could not read photo file");
        format!("Could not read {path}: {err}. Check the path and retry.")
    })
}

async fn assign_task(service: &TaskService, theme: &ColorfulTheme) -> Result<()> {
    let title: String = Input::with_theme(theme)
        .with_prompt("Task title")
        .interact_text()?;
    let id: String = Input::with_theme(theme)
        .with_prompt("Task ID")
        .default(TaskId::generate().to_string())
        .interact_text()?;

    match service.assign(id.trim(), title.trim()).await {
        Ok(view) => println!("{} assigned {}", style("OK").bold().green(), view.id),
        Err(err) => report_error(&err),
    }
    Ok(())
}

fn action_label(intent: IntentKind) -> &'static str {
    match intent {
        IntentKind::Start => "Start task",
        IntentKind::UploadBeforePhoto => "Upload before photo",
        IntentKind::MarkComplete => "Mark complete",
        IntentKind::UploadAfterPhoto => "Upload after photo",
    }
}

fn report_error(err: &TaskError) {
    warn!(task_id = %err.task_id(), error = %err, "action failed");
    println!("{}", style(err.user_message()).red());
}
