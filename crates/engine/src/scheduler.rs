use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use common::{
    BalanceSource, BotSettings, Error, MarketDataSource, OrderGateway, Result, SettingsSource,
    TradeIntent, TradeRecord, TradingPair,
};
use strategy::StrategyConfig;

use crate::sizing::position_size;
use crate::state::RiskState;

/// One active (pair, strategy) combination the scheduler evaluates.
#[derive(Debug, Clone)]
pub struct PairStrategy {
    pub pair: TradingPair,
    pub config: StrategyConfig,
}

/// Enumerates the active (pair, strategy-config) tuples. Queried every
/// tick so configuration edits take effect without a restart.
#[async_trait]
pub trait StrategySource: Send + Sync {
    async fn active_strategies(&self) -> Result<Vec<PairStrategy>>;
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Candle timeframe requested from the market data source.
    pub timeframe: String,
    /// Candle window length per fetch.
    pub candle_limit: usize,
    /// Global tick period.
    pub tick_interval: StdDuration,
    /// Minimum time between evaluations of the same pair, independent of
    /// the tick, to bound the external fetch rate.
    pub recheck_interval: Duration,
    /// Sleep before re-checking when the bot is disabled in settings.
    pub disabled_backoff: StdDuration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timeframe: "1h".to_string(),
            candle_limit: 100,
            tick_interval: StdDuration::from_secs(60),
            recheck_interval: Duration::minutes(5),
            disabled_backoff: StdDuration::from_secs(180),
        }
    }
}

/// What one tick did, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Bot disabled in settings; all pairs skipped.
    Disabled,
    Completed { evaluated: usize, executed: usize },
}

/// The risk-gated scheduling loop.
///
/// Each tick: settings gate, stale-counter purge, then per (pair, strategy)
/// the throttle and daily-limit gates, a candle fetch, strategy evaluation,
/// sizing, and order submission. Every per-strategy failure is recovered at
/// the tick boundary; the loop itself never dies.
pub struct Scheduler {
    market: Arc<dyn MarketDataSource>,
    balances: Arc<dyn BalanceSource>,
    orders: Arc<dyn OrderGateway>,
    settings: Arc<dyn SettingsSource>,
    strategies: Arc<dyn StrategySource>,
    trade_tx: mpsc::Sender<TradeRecord>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(
        market: Arc<dyn MarketDataSource>,
        balances: Arc<dyn BalanceSource>,
        orders: Arc<dyn OrderGateway>,
        settings: Arc<dyn SettingsSource>,
        strategies: Arc<dyn StrategySource>,
        trade_tx: mpsc::Sender<TradeRecord>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            market,
            balances,
            orders,
            settings,
            strategies,
            trade_tx,
            config,
        }
    }

    /// Execute one tick against an explicit clock. Pure with respect to
    /// wall time: tests drive it with fixed `now` values.
    pub async fn run_tick(&self, state: &mut RiskState, now: DateTime<Utc>) -> Result<TickOutcome> {
        let settings = self.settings.settings().await?;
        if !settings.is_active {
            debug!("Bot is disabled in settings; skipping all pairs this tick");
            return Ok(TickOutcome::Disabled);
        }

        let today = now.date_naive();
        state.purge_stale_days(today);

        let strategies = self.strategies.active_strategies().await?;
        if strategies.is_empty() {
            info!("No active strategies configured");
            return Ok(TickOutcome::Completed {
                evaluated: 0,
                executed: 0,
            });
        }

        let mut evaluated = 0;
        let mut executed = 0;
        for entry in &strategies {
            match self
                .process_strategy(entry, state, now, today, &settings)
                .await
            {
                Ok(StrategyOutcome::Skipped) => {}
                Ok(StrategyOutcome::Evaluated) => evaluated += 1,
                Ok(StrategyOutcome::Executed) => {
                    evaluated += 1;
                    executed += 1;
                }
                Err(e) if e.is_recoverable() => {
                    warn!(
                        pair = %entry.pair,
                        strategy = %entry.config.name,
                        error = %e,
                        "Strategy skipped this tick"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(TickOutcome::Completed {
            evaluated,
            executed,
        })
    }

    async fn process_strategy(
        &self,
        entry: &PairStrategy,
        state: &mut RiskState,
        now: DateTime<Utc>,
        today: NaiveDate,
        settings: &BotSettings,
    ) -> Result<StrategyOutcome> {
        let pair = &entry.pair;

        // Daily-limit gate, checked up front so capped pairs cost nothing.
        if state.trades_today(&pair.symbol, today) >= settings.max_daily_trades {
            debug!(pair = %pair, "Daily trade limit reached");
            return Ok(StrategyOutcome::Skipped);
        }

        // Per-pair throttle, independent of the global tick.
        if !state.is_due(&pair.symbol, now, self.config.recheck_interval) {
            return Ok(StrategyOutcome::Skipped);
        }
        state.mark_evaluated(&pair.symbol, now);

        let candles = self
            .market
            .candles(&pair.symbol, &self.config.timeframe, self.config.candle_limit)
            .await?;
        if candles.is_empty() {
            return Err(Error::DataUnavailable(format!(
                "no candles returned for {pair}"
            )));
        }

        let signal = strategy::get_signal(&entry.config, &candles)?;
        info!(pair = %pair, strategy = %entry.config.name, signal = %signal, "Strategy evaluated");

        let Some(side) = signal.side() else {
            return Ok(StrategyOutcome::Evaluated);
        };

        let current_price = candles.last().map(|c| c.close).unwrap_or_default();
        let balances = self.balances.balances().await?;
        let Some(amount) = position_size(
            side,
            pair,
            &balances,
            current_price,
            settings.max_trade_size,
        ) else {
            return Ok(StrategyOutcome::Evaluated);
        };

        // Gate again immediately before submission; another strategy on the
        // same pair may have traded earlier in this tick.
        if state.trades_today(&pair.symbol, today) >= settings.max_daily_trades {
            debug!(pair = %pair, "Daily trade limit reached before submission");
            return Ok(StrategyOutcome::Evaluated);
        }

        let intent = TradeIntent {
            pair: pair.clone(),
            side,
            amount,
            reference_price: current_price,
        };
        let receipt = self.orders.submit_order(&intent).await?;
        state.record_trade(&pair.symbol, today);

        info!(
            pair = %pair,
            side = %side,
            amount,
            price = receipt.price,
            order_id = %receipt.order_id,
            "Order executed"
        );

        let record = TradeRecord {
            order_id: receipt.order_id,
            pair: pair.clone(),
            strategy_name: entry.config.name.clone(),
            side,
            price: receipt.price,
            amount: receipt.amount,
            fee: receipt.fee,
            status: receipt.status,
            executed_at: now,
        };
        if self.trade_tx.send(record).await.is_err() {
            warn!("Trade record channel closed — record dropped");
        }

        Ok(StrategyOutcome::Executed)
    }

    /// Run the tick loop until the shutdown flag flips. Tick errors are
    /// logged and the loop continues; it never exits on its own.
    pub async fn run(self: Arc<Self>, mut state: RiskState, mut shutdown: watch::Receiver<bool>) {
        info!(
            tick_secs = self.config.tick_interval.as_secs(),
            "Scheduler running"
        );
        loop {
            let sleep_for = match self.run_tick(&mut state, Utc::now()).await {
                Ok(TickOutcome::Disabled) => self.config.disabled_backoff,
                Ok(TickOutcome::Completed {
                    evaluated,
                    executed,
                }) => {
                    debug!(evaluated, executed, "Tick complete");
                    self.config.tick_interval
                }
                Err(e) => {
                    error!(error = %e, "Tick failed");
                    self.config.tick_interval
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Shutdown signalled — scheduler exiting");
                        return;
                    }
                }
            }
        }
    }
}

enum StrategyOutcome {
    /// Gate or throttle kept the strategy from being evaluated.
    Skipped,
    /// Evaluated without an executed trade (neutral, unsized, or capped).
    Evaluated,
    /// Evaluated and an order went through.
    Executed,
}
