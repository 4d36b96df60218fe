use std::collections::HashMap;

use async_trait::async_trait;

use crate::{AssetBalance, BotSettings, Candle, OrderReceipt, Result, TradeIntent};

/// Candle history provider. Live implementation: `exchange::CoinexClient`.
///
/// Returned candles are ordered oldest first with strictly increasing
/// timestamps. An empty or failed fetch surfaces as `Error::DataUnavailable`.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn candles(&self, symbol: &str, timeframe: &str, limit: usize) -> Result<Vec<Candle>>;

    /// Latest traded price for a symbol.
    async fn ticker_price(&self, symbol: &str) -> Result<f64>;
}

/// Account balance provider, keyed by currency code.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn balances(&self) -> Result<HashMap<String, AssetBalance>>;
}

/// Order execution collaborator. Only the scheduler submits intents; all of
/// them have already passed the daily-limit and sizing gates.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn submit_order(&self, intent: &TradeIntent) -> Result<OrderReceipt>;
}

/// Bot-level settings provider, queried at the top of every tick.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    async fn settings(&self) -> Result<BotSettings>;
}
