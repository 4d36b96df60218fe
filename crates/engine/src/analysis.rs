use serde::Serialize;

use common::{Candle, Error, MarketDataSource, Result};
use strategy::indicators::IndicatorBundle;
use strategy::{Analysis, StrategyConfig};

/// On-demand evaluation payload: the strategy's signal and detail plus the
/// full indicator snapshot over the fetched window. Served to interactive
/// callers independently of the scheduler tick.
#[derive(Debug, Clone, Serialize)]
pub struct PairAnalysis {
    pub analysis: Analysis,
    pub indicators: IndicatorBundle,
    pub candles: Vec<Candle>,
}

/// Fetch a fresh candle window for the pair and evaluate one strategy
/// against it.
pub async fn analyze_pair(
    market: &dyn MarketDataSource,
    config: &StrategyConfig,
    timeframe: &str,
    limit: usize,
) -> Result<PairAnalysis> {
    let candles = market.candles(&config.pair, timeframe, limit).await?;
    if candles.is_empty() {
        return Err(Error::DataUnavailable(format!(
            "no candles returned for {}",
            config.pair
        )));
    }

    let analysis = strategy::analyze(config, &candles)?;
    let indicators = IndicatorBundle::compute(&candles);

    Ok(PairAnalysis {
        analysis,
        indicators,
        candles,
    })
}
