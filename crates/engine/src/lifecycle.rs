use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::scheduler::Scheduler;
use crate::state::RiskState;

/// Owns the single background scheduler task.
///
/// `start` is a no-op while a worker is running. `stop` flips the shutdown
/// flag and waits up to `stop_timeout` for the in-flight tick to finish;
/// when the timeout elapses the task is abandoned (left to drain on its
/// own), never aborted mid-tick.
pub struct BotWorker {
    scheduler: Arc<Scheduler>,
    stop_timeout: Duration,
    running: Option<RunningWorker>,
}

struct RunningWorker {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl BotWorker {
    pub fn new(scheduler: Arc<Scheduler>, stop_timeout: Duration) -> Self {
        Self {
            scheduler,
            stop_timeout,
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .map(|w| !w.join.is_finished())
            .unwrap_or(false)
    }

    /// Spawn the scheduler loop with fresh risk state. Returns false when
    /// a worker is already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            warn!("Bot worker is already running");
            return false;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(self.scheduler.clone().run(RiskState::new(), shutdown_rx));
        self.running = Some(RunningWorker { shutdown_tx, join });

        info!("Bot worker started");
        true
    }

    /// Request shutdown and wait, bounded, for the loop to exit. Returns
    /// false when no worker was running.
    pub async fn stop(&mut self) -> bool {
        let Some(worker) = self.running.take() else {
            warn!("Bot worker is not running");
            return false;
        };

        let _ = worker.shutdown_tx.send(true);
        match tokio::time::timeout(self.stop_timeout, worker.join).await {
            Ok(_) => info!("Bot worker stopped"),
            Err(_) => warn!(
                timeout_secs = self.stop_timeout.as_secs(),
                "Bot worker did not stop in time — abandoning the task"
            ),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use common::{
        AssetBalance, BalanceSource, BotSettings, Candle, MarketDataSource, OrderGateway,
        OrderReceipt, Result, SettingsSource, TradeIntent,
    };

    use crate::scheduler::{PairStrategy, SchedulerConfig, StrategySource};

    struct Inert;

    #[async_trait]
    impl MarketDataSource for Inert {
        async fn candles(&self, _: &str, _: &str, _: usize) -> Result<Vec<Candle>> {
            Ok(vec![])
        }
        async fn ticker_price(&self, _: &str) -> Result<f64> {
            Ok(0.0)
        }
    }

    #[async_trait]
    impl BalanceSource for Inert {
        async fn balances(&self) -> Result<HashMap<String, AssetBalance>> {
            Ok(HashMap::new())
        }
    }

    #[async_trait]
    impl OrderGateway for Inert {
        async fn submit_order(&self, _: &TradeIntent) -> Result<OrderReceipt> {
            unreachable!("no orders in lifecycle tests")
        }
    }

    #[async_trait]
    impl SettingsSource for Inert {
        async fn settings(&self) -> Result<BotSettings> {
            // Disabled: the loop just sleeps on the backoff interval.
            Ok(BotSettings::default())
        }
    }

    #[async_trait]
    impl StrategySource for Inert {
        async fn active_strategies(&self) -> Result<Vec<PairStrategy>> {
            Ok(vec![])
        }
    }

    /// Settings source that never resolves, pinning the loop mid-tick.
    struct Stuck;

    #[async_trait]
    impl SettingsSource for Stuck {
        async fn settings(&self) -> Result<BotSettings> {
            std::future::pending().await
        }
    }

    fn idle_scheduler() -> Arc<Scheduler> {
        let (trade_tx, _rx) = mpsc::channel(1);
        let inert = Arc::new(Inert);
        Arc::new(Scheduler::new(
            inert.clone(),
            inert.clone(),
            inert.clone(),
            inert.clone(),
            inert,
            trade_tx,
            SchedulerConfig::default(),
        ))
    }

    #[tokio::test]
    async fn start_twice_is_a_no_op() {
        let mut worker = BotWorker::new(idle_scheduler(), Duration::from_secs(1));
        assert!(worker.start());
        assert!(!worker.start());
        assert!(worker.is_running());
        assert!(worker.stop().await);
    }

    #[tokio::test]
    async fn stop_without_start_reports_not_running() {
        let mut worker = BotWorker::new(idle_scheduler(), Duration::from_secs(1));
        assert!(!worker.stop().await);
    }

    #[tokio::test]
    async fn stop_abandons_a_tick_that_outlives_the_timeout() {
        let (trade_tx, _rx) = mpsc::channel(1);
        let inert = Arc::new(Inert);
        let scheduler = Arc::new(Scheduler::new(
            inert.clone(),
            inert.clone(),
            inert.clone(),
            Arc::new(Stuck),
            inert,
            trade_tx,
            SchedulerConfig::default(),
        ));

        let stop_timeout = Duration::from_millis(50);
        let mut worker = BotWorker::new(scheduler, stop_timeout);
        assert!(worker.start());
        // Let the loop enter the stuck tick before asking it to stop.
        tokio::time::sleep(Duration::from_millis(10)).await;

        let started = tokio::time::Instant::now();
        assert!(worker.stop().await);
        assert!(
            started.elapsed() >= stop_timeout,
            "stop returned before the bounded wait elapsed"
        );
        // The task was abandoned, not joined, and the worker is free to
        // spawn a replacement.
        assert!(!worker.is_running());
        assert!(worker.start());
    }

    #[tokio::test]
    async fn stop_then_restart_spawns_a_new_loop() {
        let mut worker = BotWorker::new(idle_scheduler(), Duration::from_secs(1));
        assert!(worker.start());
        assert!(worker.stop().await);
        assert!(!worker.is_running());
        assert!(worker.start());
        assert!(worker.stop().await);
    }
}
