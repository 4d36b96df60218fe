use async_trait::async_trait;
use tracing::warn;

use common::{BotSettings, Config, Result, SettingsSource, TradingPair};
use engine::{PairStrategy, StrategySource};
use strategy::StrategyFileConfig;

/// Settings snapshot taken at startup from environment config. The
/// scheduler re-reads it every tick, so a richer implementation (database,
/// admin API) can be swapped in without touching the loop.
pub struct StaticSettings {
    settings: BotSettings,
}

impl StaticSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            settings: BotSettings {
                is_active: cfg.bot_active,
                max_daily_trades: cfg.max_daily_trades,
                max_trade_size: cfg.max_trade_size,
                api_key: cfg.coinex_api_key.clone(),
                api_secret: cfg.coinex_api_secret.clone(),
            },
        }
    }
}

#[async_trait]
impl SettingsSource for StaticSettings {
    async fn settings(&self) -> Result<BotSettings> {
        Ok(self.settings.clone())
    }
}

/// Strategy list loaded from the TOML config file at startup. Entries with
/// an unparseable pair symbol are dropped with a warning rather than
/// poisoning the whole list.
pub struct FileStrategySource {
    strategies: Vec<PairStrategy>,
}

impl FileStrategySource {
    pub fn new(file: &StrategyFileConfig) -> Self {
        let strategies = file
            .strategies
            .iter()
            .filter_map(|config| match TradingPair::parse(&config.pair) {
                Some(pair) => Some(PairStrategy {
                    pair,
                    config: config.clone(),
                }),
                None => {
                    warn!(
                        strategy = %config.name,
                        pair = %config.pair,
                        "Skipping strategy with invalid pair symbol (expected BASE/QUOTE)"
                    );
                    None
                }
            })
            .collect();
        Self { strategies }
    }
}

#[async_trait]
impl StrategySource for FileStrategySource {
    async fn active_strategies(&self) -> Result<Vec<PairStrategy>> {
        Ok(self.strategies.clone())
    }
}
