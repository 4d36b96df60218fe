//! Pure indicator functions over price series.
//!
//! Every function returns series index-aligned with its input: entry `i`
//! is `None` while the indicator is still inside its warm-up window and
//! `Some(value)` afterwards. No shared state, no I/O.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use bollinger::{bollinger_bands, BollingerSeries};
pub use ema::ema;
pub use macd::{macd, MacdSeries};
pub use rsi::rsi;
pub use sma::sma;
pub use stochastic::{stochastic, StochasticSeries};

use serde::Serialize;

use common::Candle;

/// An indicator output aligned index-for-index with its input candles.
pub type Series = Vec<Option<f64>>;

/// Latest defined value of a series, scanning backward past the warm-up
/// `None`s. A defined zero is a value; only `None` is skipped.
pub fn last_defined(series: &[Option<f64>]) -> Option<f64> {
    series.iter().rev().find_map(|v| *v)
}

/// Previous defined value: scan backward starting one before the end.
pub fn prev_defined(series: &[Option<f64>]) -> Option<f64> {
    let n = series.len();
    if n < 2 {
        return None;
    }
    series[..n - 1].iter().rev().find_map(|v| *v)
}

/// Snapshot of the standard indicator set over one candle window, all
/// series mutually index-aligned. Returned in on-demand analysis payloads.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorBundle {
    pub sma_20: Series,
    pub sma_50: Series,
    pub sma_200: Series,
    pub ema_12: Series,
    pub ema_26: Series,
    pub rsi_14: Series,
    pub macd: MacdSeries,
    pub bollinger: BollingerSeries,
    pub stochastic: StochasticSeries,
}

impl IndicatorBundle {
    /// Compute the full set from one candle sequence.
    pub fn compute(candles: &[Candle]) -> Self {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();

        Self {
            sma_20: sma(&closes, 20),
            sma_50: sma(&closes, 50),
            sma_200: sma(&closes, 200),
            ema_12: ema(&closes, 12),
            ema_26: ema(&closes, 26),
            rsi_14: rsi(&closes, 14),
            macd: macd(&closes, 12, 26, 9),
            bollinger: bollinger_bands(&closes, 20, 2.0),
            stochastic: stochastic(&highs, &lows, &closes, 14, 3),
        }
    }
}
