/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When RunnerConfig schema changes
*/

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};

use gogreen_task_core::{DEFAULT_WINDOW_SECS, TaskId, WindowSettings};
use gogreen_task_runner::{RunnerConfig, TaskSeed};

pub fn run_init(output: PathBuf) -> Result<()> {
    println!("{}", style("Welcome to GoGreen Tasks Init").bold().green());
    println!(
        "{}",
        style("This will guide you through creating a runner configuration.").dim()
    );

    let theme = ColorfulTheme::default();

    println!("\n{}", style("--- Photo Windows ---").bold());
    let before_window_secs: u32 = Input::with_theme(&theme)
        .with_prompt("Before-photo window (seconds)")
        .default(DEFAULT_WINDOW_SECS)
        .validate_with(|secs: &u32| positive(*secs))
        .interact_text()?;
    let after_window_secs: u32 = Input::with_theme(&theme)
        .with_prompt("After-photo window (seconds)")
        .default(DEFAULT_WINDOW_SECS)
        .validate_with(|secs: &u32| positive(*secs))
        .interact_text()?;

    println!("\n{}", style("--- Tasks ---").bold());
    let mut tasks = Vec::new();
    loop {
        let title: String = Input::with_theme(&theme)
            .with_prompt("Task title")
            .interact_text()?;
        let id: String = Input::with_theme(&theme)
            .with_prompt("Task ID")
            .default(TaskId::generate().to_string())
            .interact_text()?;
        tasks.push(TaskSeed {
            id: id.trim().to_string(),
            title: title.trim().to_string(),
        });

        let more = Confirm::with_theme(&theme)
            .with_prompt("Add another task?")
            .default(false)
            .interact()?;
        if !more {
            break;
        }
    }

    let config = RunnerConfig {
        engine: WindowSettings {
            before_window_secs,
            after_window_secs,
        },
        tasks,
        ..RunnerConfig::default()
    };
    config.validate().context("generated configuration is invalid")?;

    let yaml = serde_yaml::to_string(&config).context("failed to serialize config to YAML")?;

    std::fs::write(&output, yaml)
        .with_context(|| format!("failed to write config to {}", output.display()))?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!(
        "Configuration written to: {}",
        style(output.display()).cyan()
    );

    Ok(())
}

fn positive(secs: u32) -> Result<(), &'static str> {
    if secs == 0 {
        Err("must be at least one second")
    } else {
        Ok(())
    }
}
