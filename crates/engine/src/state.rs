use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Process-local scheduler state: per-(pair, UTC day) executed-trade
/// counters and per-pair last-evaluation timestamps.
///
/// There is exactly one writer (the scheduler), so no synchronization is
/// needed. The state is passed into each tick explicitly, which keeps tick
/// logic testable against a fixed clock. Nothing here is persisted; a
/// restart starts from zero.
#[derive(Debug, Default)]
pub struct RiskState {
    daily_trades: HashMap<(String, NaiveDate), u32>,
    last_evaluated: HashMap<String, DateTime<Utc>>,
}

impl RiskState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop trade counters for any day other than `today`. Called at the
    /// top of every tick so the previous day's counts become unreachable
    /// as soon as the UTC date rolls over.
    pub fn purge_stale_days(&mut self, today: NaiveDate) {
        self.daily_trades.retain(|(_, day), _| *day == today);
    }

    pub fn trades_today(&self, symbol: &str, day: NaiveDate) -> u32 {
        self.daily_trades
            .get(&(symbol.to_string(), day))
            .copied()
            .unwrap_or(0)
    }

    pub fn record_trade(&mut self, symbol: &str, day: NaiveDate) {
        *self
            .daily_trades
            .entry((symbol.to_string(), day))
            .or_insert(0) += 1;
    }

    /// True when the pair has never been evaluated or its last evaluation
    /// is at least `min_interval` old. Bounds the external fetch rate
    /// independently of the global tick.
    pub fn is_due(&self, symbol: &str, now: DateTime<Utc>, min_interval: Duration) -> bool {
        match self.last_evaluated.get(symbol) {
            None => true,
            Some(last) => now - *last >= min_interval,
        }
    }

    pub fn mark_evaluated(&mut self, symbol: &str, now: DateTime<Utc>) {
        self.last_evaluated.insert(symbol.to_string(), now);
    }
}
