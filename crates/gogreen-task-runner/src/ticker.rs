/*
[INPUT]:  Tick period, CancellationToken, per-tick callback
[OUTPUT]: Background tokio task invoking the callback on a fixed cadence
[POS]:    Runtime layer - cancellable replacement for interval polling
[UPDATE]: When tick scheduling or cancellation semantics change
*/

use std::future::Future;
use std::time::Duration;

use anyhow::{Result, ensure};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Fixed-cadence ticker owned by the process and stopped by its token.
///
/// Late ticks are skipped rather than bursted; callers recompute from
/// absolute time, so a skipped tick loses nothing.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    shutdown: CancellationToken,
}

impl Ticker {
    /// `period` must be non-zero.
    pub fn new(period: Duration, shutdown: CancellationToken) -> Result<Self> {
        ensure!(!period.is_zero(), "ticker period must be positive");
        Ok(Self { period, shutdown })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run `on_tick` every period until the token is cancelled.
    pub fn spawn<F, Fut>(self, mut on_tick: F) -> JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        debug!("ticker stopped");
                        break;
                    }
                    _ = interval.tick() => on_tick().await,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_ticker_runs_until_cancelled() {
        let shutdown = CancellationToken::new();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = count.clone();
        let ticker = Ticker::new(Duration::from_millis(10), shutdown.clone()).unwrap();
        let handle = ticker.spawn(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(80)).await;
        shutdown.cancel();
        handle.await.unwrap();

        let seen = count.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected several ticks, saw {seen}");

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }

    #[test]
    fn test_zero_period_rejected() {
        let err = Ticker::new(Duration::ZERO, CancellationToken::new()).unwrap_err();
        assert!(err.to_string().contains("ticker period"));
    }
}
