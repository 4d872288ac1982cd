/*
[INPUT]:  RunnerConfig, Clock, PhotoUploader, user intents from presentation
[OUTPUT]: Serialized engine access, background ticking, TaskView watch channel
[POS]:    Execution layer - hosts the lifecycle engine inside the tokio runtime
[UPDATE]: When intent serialization, upload flow or shutdown guarantees change
*/

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result, anyhow};
use gogreen_task_core::{
    Clock, IntentKind, PhotoSlot, PhotoUploader, Task, TaskError, TaskLifecycleEngine,
    TaskSummary, TaskView, TickReport, allowed_intents,
};
use tokio::sync::{Mutex, MutexGuard, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::ticker::Ticker;
use crate::uploader::SimulatedPhotoUploader;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

type EngineResult<T> = std::result::Result<T, TaskError>;

/// Owns the engine and applies every intent and tick under one lock.
///
/// Holding the lock for the whole of an intent means no caller can observe a
/// half-applied transition. Uploads release the lock while the collaborator
/// runs so ticks keep evaluating the in-flight task.
pub struct TaskService {
    engine: Arc<Mutex<TaskLifecycleEngine>>,
    clock: Arc<dyn Clock>,
    uploader: Arc<dyn PhotoUploader>,
    views_tx: Arc<watch::Sender<Vec<TaskView>>>,
    tick_period: Duration,
    shutdown: CancellationToken,
    ticker: Option<JoinHandle<()>>,
}

impl TaskService {
    pub fn new(
        engine: TaskLifecycleEngine,
        uploader: Arc<dyn PhotoUploader>,
        tick_period: Duration,
    ) -> Self {
        let clock = engine.clock();
        let (views_tx, _) = watch::channel(engine.views());
        Self {
            engine: Arc::new(Mutex::new(engine)),
            clock,
            uploader,
            views_tx: Arc::new(views_tx),
            tick_period,
            shutdown: CancellationToken::new(),
            ticker: None,
        }
    }

    /// Build an engine from configuration, seed its tasks and use the simulated uploader.
    pub fn from_config(config: &RunnerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let uploader = Arc::new(
            SimulatedPhotoUploader::from_config(&config.uploads, clock.clone())
                .context("build photo uploader")?,
        );
        Self::from_config_with_uploader(config, clock, uploader)
    }

    pub fn from_config_with_uploader(
        config: &RunnerConfig,
        clock: Arc<dyn Clock>,
        uploader: Arc<dyn PhotoUploader>,
    ) -> Result<Self> {
        let mut engine = TaskLifecycleEngine::with_windows(clock, config.engine);
        for seed in &config.tasks {
            engine
                .assign(seed.id.as_str(), seed.title.as_str())
                .with_context(|| format!("assign seed task task_id={}", seed.id))?;
        }
        if engine.is_empty() {
            warn!("no seed tasks configured");
        }
        let windows = engine.windows();
        info!(
            task_count = engine.len(),
            before_window_secs = windows.before_window_secs,
            after_window_secs = windows.after_window_secs,
            "lifecycle engine ready"
        );

        Ok(Self::new(
            engine,
            uploader,
            Duration::from_millis(config.ticker.interval_ms),
        ))
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Projection stream, refreshed after every tick and every intent.
    pub fn subscribe(&self) -> watch::Receiver<Vec<TaskView>> {
        self.views_tx.subscribe()
    }

    /// Start the background ticker. Calling it twice is a no-op.
    pub fn spawn_ticker(&mut self) -> Result<()> {
        if self.ticker.is_some() {
            return Ok(());
        }

        let engine = self.engine.clone();
        let clock = self.clock.clone();
        let views_tx = self.views_tx.clone();
        let ticker = Ticker::new(self.tick_period, self.shutdown.child_token())?;
        info!(period_ms = ticker.period().as_millis() as u64, "starting ticker");

        self.ticker = Some(ticker.spawn(move || {
            let engine = engine.clone();
            let clock = clock.clone();
            let views_tx = views_tx.clone();
            async move {
                let mut engine = engine.lock().await;
                let now = clock.now();
                engine.tick(now);
                views_tx.send_replace(engine.views_at(now));
            }
        }));
        Ok(())
    }

    /// Run one tick immediately at the clock's current time.
    pub async fn tick_now(&self) -> TickReport {
        let mut engine = self.engine.lock().await;
        let report = engine.tick(self.clock.now());
        self.publish(&engine);
        report
    }

    pub async fn assign(&self, id: &str, title: &str) -> EngineResult<TaskView> {
        let mut engine = self.engine.lock().await;
        let result = engine.assign(id, title);
        self.publish(&engine);
        result
    }

    pub async fn start(&self, task_id: &str) -> EngineResult<TaskView> {
        let mut engine = self.engine.lock().await;
        let result = engine.start(task_id);
        self.publish(&engine);
        result
    }

    pub async fn mark_complete(&self, task_id: &str) -> EngineResult<TaskView> {
        let mut engine = self.engine.lock().await;
        let result = engine.mark_complete(task_id);
        self.publish(&engine);
        result
    }

    pub async fn upload_before_photo(&self, task_id: &str, payload: Vec<u8>) -> EngineResult<TaskView> {
        self.upload(task_id, PhotoSlot::Before, payload).await
    }

    pub async fn upload_after_photo(&self, task_id: &str, payload: Vec<u8>) -> EngineResult<TaskView> {
        self.upload(task_id, PhotoSlot::After, payload).await
    }

    async fn upload(&self, task_id: &str, slot: PhotoSlot, payload: Vec<u8>) -> EngineResult<TaskView> {
        let task = {
            let engine = self.engine.lock().await;
            engine.begin_upload(task_id, slot)?;
            engine.snapshot(task_id)?
        };

        debug!(task_id, %slot, bytes = payload.len(), "dispatching photo upload");
        let outcome = self.uploader.upload(&task.id, payload).await;

        let mut engine = self.engine.lock().await;
        let result = engine.complete_upload(task_id, slot, outcome);
        self.publish(&engine);
        result
    }

    /// Intents the presentation may offer for a task right now.
    pub async fn allowed_intents(&self, task_id: &str) -> EngineResult<Vec<IntentKind>> {
        let engine = self.engine.lock().await;
        let task = engine.snapshot(task_id)?;
        Ok(allowed_intents(&task))
    }

    pub async fn snapshot(&self, task_id: &str) -> EngineResult<Task> {
        self.engine.lock().await.snapshot(task_id)
    }

    pub async fn views(&self) -> Vec<TaskView> {
        self.engine.lock().await.views()
    }

    pub async fn summary(&self) -> TaskSummary {
        self.engine.lock().await.summary()
    }

    /// Stop the ticker and wait for it, aborting after a bounded timeout.
    pub async fn shutdown_and_wait(&mut self) -> Result<()> {
        self.shutdown.cancel();
        let Some(mut handle) = self.ticker.take() else {
            return Ok(());
        };

        tokio::select! {
            res = &mut handle => {
                match res {
                    Ok(()) => {
                        info!("ticker shutdown complete");
                        Ok(())
                    }
                    Err(join_err) if join_err.is_panic() => {
                        Err(anyhow!("ticker panicked: {join_err}"))
                    }
                    Err(join_err) => Err(anyhow!("ticker join error: {join_err}")),
                }
            }
            _ = tokio::time::sleep(SHUTDOWN_TIMEOUT) => {
                warn!(timeout = ?SHUTDOWN_TIMEOUT, "ticker did not stop in time; aborting");
                handle.abort();
                Err(anyhow!("ticker shutdown timed out after {SHUTDOWN_TIMEOUT:?}"))
            }
        }
    }

    fn publish(&self, engine: &MutexGuard<'_, TaskLifecycleEngine>) {
        self.views_tx.send_replace(engine.views());
    }
}

impl Drop for TaskService {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
