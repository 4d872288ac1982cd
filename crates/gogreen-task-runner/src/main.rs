/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Running task lifecycle engine with periodic dashboard and graceful shutdown
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use gogreen_task_core::{SystemClock, TaskSummary};
use gogreen_task_runner::{RunnerConfig, TaskService, render_dashboard};

#[derive(Parser, Debug)]
#[command(name = "gogreen-tasks", version, about = "GoGreen employee task lifecycle runner")]
struct Cli {
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,
    /// Write logs to this file instead of stderr
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run headless, printing the dashboard periodically until interrupted
    Run {
        #[arg(long = "config", value_name = "PATH")]
        config_path: PathBuf,
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Drive tasks from an interactive menu
    Interactive {
        #[arg(long = "config", value_name = "PATH")]
        config_path: Option<PathBuf>,
    },
    /// Write a new configuration file from prompts
    Init {
        #[arg(long = "output", value_name = "PATH", default_value = "gogreen.yaml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let _log_guard = init_tracing(&args.log_level, args.log_file.as_deref())?;

    match args.command {
        Command::Run {
            config_path,
            dry_run,
        } => run(&config_path, dry_run).await,
        Command::Interactive { config_path } => {
            let config = match config_path {
                Some(path) => load_config(&path)?,
                None => RunnerConfig::default(),
            };
            let mut service = TaskService::from_config(&config, Arc::new(SystemClock))
                .context("build task service")?;
            service.spawn_ticker().context("start ticker")?;
            let shutdown = service.shutdown_token();
            setup_signal_handlers(shutdown.clone());

            let outcome = cli::interactive::run_interactive(&service, &shutdown).await;
            service
                .shutdown_and_wait()
                .await
                .context("shutdown ticker")?;
            outcome
        }
        Command::Init { output } => cli::init::run_init(output),
    }
}

async fn run(config_path: &Path, dry_run: bool) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        dry_run,
        "starting gogreen-tasks"
    );

    let config = load_config(config_path)?;
    info!(task_count = config.tasks.len(), "configuration loaded");

    if dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let mut service =
        TaskService::from_config(&config, Arc::new(SystemClock)).context("build task service")?;
    let shutdown = service.shutdown_token();
    setup_signal_handlers(shutdown.clone());

    service.spawn_ticker().context("start ticker")?;
    info!("ticker started");

    let mut views_rx = service.subscribe();
    let mut report = tokio::time::interval(Duration::from_secs(config.report_interval_secs));
    report.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = report.tick() => {
                let views = views_rx.borrow_and_update().clone();
                let summary = TaskSummary::from_states(views.iter().map(|view| view.state));
                println!("{}", render_dashboard(&views, &summary));
                info!(
                    total = summary.total,
                    pending = summary.pending,
                    active = summary.active,
                    done = summary.done,
                    escalated = summary.escalated,
                    "task summary"
                );
            }
        }
    }
    info!("shutdown signal received");

    service
        .shutdown_and_wait()
        .await
        .context("shutdown ticker")?;
    info!("runner shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|err| anyhow!(err))
            .context("initialize tracing subscriber")?;
        return Ok(None);
    };

    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().context("log file path must name a file")?;
    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(Some(guard))
}

fn load_config(path: &Path) -> Result<RunnerConfig> {
    RunnerConfig::from_file(path)
        .with_context(|| format!("load config from {}", path.display()))
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
