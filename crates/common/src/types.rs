use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV interval as returned by the market data source.
/// Sequences are ordered oldest first with strictly increasing timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Flat candle at a single price, mostly useful in tests.
    pub fn flat(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            timestamp,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 0.0,
        }
    }
}

/// A tradable pair, e.g. BTC/USDT: USDT (quote) is spent to buy BTC (base).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    /// Exchange symbol, e.g. "BTC/USDT".
    pub symbol: String,
    pub base: String,
    pub quote: String,
}

impl TradingPair {
    /// Parse a "BASE/QUOTE" symbol. Returns `None` when either leg is empty.
    pub fn parse(symbol: &str) -> Option<Self> {
        let (base, quote) = symbol.split_once('/')?;
        if base.is_empty() || quote.is_empty() {
            return None;
        }
        Some(Self {
            symbol: symbol.to_string(),
            base: base.to_string(),
            quote: quote.to_string(),
        })
    }
}

impl std::fmt::Display for TradingPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Discrete outcome of one strategy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

impl Signal {
    pub fn side(self) -> Option<OrderSide> {
        match self {
            Signal::Buy => Some(OrderSide::Buy),
            Signal::Sell => Some(OrderSide::Sell),
            Signal::Neutral => None,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// A sized trade the scheduler wants executed. Ownership passes to the
/// order gateway; the reference price is the close the size was computed at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeIntent {
    pub pair: TradingPair,
    pub side: OrderSide,
    /// Amount in base-currency units.
    pub amount: f64,
    pub reference_price: f64,
}

/// Result of a submitted order as reported by the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub price: f64,
    pub amount: f64,
    pub fee: f64,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Open,
    Filled,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "OPEN"),
            OrderStatus::Filled => write!(f, "FILLED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// An executed trade, emitted once per successful order for the host to
/// persist. The scheduler itself keeps no durable trade history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub order_id: String,
    pub pair: TradingPair,
    pub strategy_name: String,
    pub side: OrderSide,
    pub price: f64,
    pub amount: f64,
    pub fee: f64,
    pub status: OrderStatus,
    pub executed_at: DateTime<Utc>,
}

/// Free/locked balance of one currency.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AssetBalance {
    pub free: f64,
    pub locked: f64,
}

/// Bot-level settings served by the settings collaborator. Re-read every
/// tick so edits take effect without a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    pub is_active: bool,
    pub max_daily_trades: u32,
    /// Maximum quote-currency notional of a single trade.
    pub max_trade_size: f64,
    pub api_key: String,
    pub api_secret: String,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            is_active: false,
            max_daily_trades: 10,
            max_trade_size: 0.01,
            api_key: String::new(),
            api_secret: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_parse_splits_base_and_quote() {
        let pair = TradingPair::parse("BTC/USDT").unwrap();
        assert_eq!(pair.base, "BTC");
        assert_eq!(pair.quote, "USDT");
        assert_eq!(pair.symbol, "BTC/USDT");
    }

    #[test]
    fn pair_parse_rejects_missing_leg() {
        assert!(TradingPair::parse("BTCUSDT").is_none());
        assert!(TradingPair::parse("/USDT").is_none());
        assert!(TradingPair::parse("BTC/").is_none());
    }

    #[test]
    fn neutral_signal_has_no_side() {
        assert_eq!(Signal::Buy.side(), Some(OrderSide::Buy));
        assert_eq!(Signal::Sell.side(), Some(OrderSide::Sell));
        assert_eq!(Signal::Neutral.side(), None);
    }
}
