use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use common::{Error, Result};

/// The closed set of strategy kinds the evaluator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    MaCrossover,
    Rsi,
    Macd,
    BollingerBands,
}

impl StrategyKind {
    pub fn id(self) -> &'static str {
        match self {
            StrategyKind::MaCrossover => "ma_crossover",
            StrategyKind::Rsi => "rsi",
            StrategyKind::Macd => "macd",
            StrategyKind::BollingerBands => "bollinger_bands",
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ma_crossover" => Ok(StrategyKind::MaCrossover),
            "rsi" => Ok(StrategyKind::Rsi),
            "macd" => Ok(StrategyKind::Macd),
            "bollinger_bands" => Ok(StrategyKind::BollingerBands),
            other => Err(Error::ConfigurationMissing(format!(
                "unknown strategy kind '{other}'"
            ))),
        }
    }
}

/// Top-level strategy config file (TOML).
///
/// Example `config/strategies.toml`:
/// ```toml
/// [[strategy]]
/// type = "rsi"
/// name = "BTC RSI 14"
/// pair = "BTC/USDT"
///
/// [strategy.params]
/// period = 14
/// overbought = 70.0
/// oversold = 30.0
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyFileConfig {
    #[serde(rename = "strategy")]
    pub strategies: Vec<StrategyConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyConfig {
    /// Strategy kind identifier, e.g. "ma_crossover".
    #[serde(rename = "type")]
    pub kind: StrategyKind,
    /// Human-readable name shown in logs and trade records.
    pub name: String,
    /// Trading pair symbol, e.g. "BTC/USDT".
    pub pair: String,
    /// Indicator-specific parameters; unset keys fall back to the kind's
    /// declared defaults. Bounds are advisory (UI validation only) and are
    /// not enforced here.
    #[serde(default)]
    pub params: HashMap<String, toml::Value>,
}

impl StrategyConfig {
    pub fn new(kind: StrategyKind, name: impl Into<String>, pair: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            pair: pair.into(),
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn param_f64(&self, key: &str, default: f64) -> f64 {
        self.params
            .get(key)
            .and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
            .unwrap_or(default)
    }

    /// Negative values never wrap: anything that does not fit a usize
    /// falls back to the default.
    pub fn param_usize(&self, key: &str, default: usize) -> usize {
        self.params
            .get(key)
            .and_then(|v| v.as_integer())
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(default)
    }
}

impl StrategyFileConfig {
    /// Load from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigurationMissing(format!("cannot read '{path}': {e}")))?;
        toml::from_str(&content)
            .map_err(|e| Error::ConfigurationMissing(format!("cannot parse '{path}': {e}")))
    }
}
