use serde::Serialize;
use serde_json::json;

use crate::config::StrategyKind;

/// UI-facing description of one strategy kind: its identifier and the
/// parameter set with defaults and advisory min/max bounds. Bounds are for
/// form validation only; the evaluator does not enforce them.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParamSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub default: serde_json::Value,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub min: serde_json::Value,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub max: serde_json::Value,
    pub description: &'static str,
}

fn int_param(
    name: &'static str,
    default: i64,
    min: i64,
    max: i64,
    description: &'static str,
) -> ParamSpec {
    ParamSpec {
        name,
        kind: "int",
        default: json!(default),
        min: json!(min),
        max: json!(max),
        description,
    }
}

fn float_param(
    name: &'static str,
    default: f64,
    min: f64,
    max: f64,
    description: &'static str,
) -> ParamSpec {
    ParamSpec {
        name,
        kind: "float",
        default: json!(default),
        min: json!(min),
        max: json!(max),
        description,
    }
}

/// Catalog of every available strategy, for configuration UIs.
pub fn available_strategies() -> Vec<StrategyDescriptor> {
    vec![
        StrategyDescriptor {
            id: StrategyKind::MaCrossover.id(),
            name: "Moving Average Crossover",
            description: "Generate signals based on moving average crossovers",
            parameters: vec![
                int_param("fast_period", 20, 3, 200, "Fast MA period"),
                int_param("slow_period", 50, 5, 200, "Slow MA period"),
            ],
        },
        StrategyDescriptor {
            id: StrategyKind::Rsi.id(),
            name: "RSI Strategy",
            description: "Generate signals based on RSI overbought/oversold conditions",
            parameters: vec![
                int_param("period", 14, 2, 50, "RSI period"),
                int_param("oversold", 30, 10, 40, "Oversold threshold"),
                int_param("overbought", 70, 60, 90, "Overbought threshold"),
            ],
        },
        StrategyDescriptor {
            id: StrategyKind::Macd.id(),
            name: "MACD Crossover",
            description: "Generate signals based on MACD line crossing signal line",
            parameters: vec![
                int_param("fast_period", 12, 5, 50, "Fast EMA period"),
                int_param("slow_period", 26, 10, 100, "Slow EMA period"),
                int_param("signal_period", 9, 3, 30, "Signal line period"),
            ],
        },
        StrategyDescriptor {
            id: StrategyKind::BollingerBands.id(),
            name: "Bollinger Bands Strategy",
            description: "Generate signals based on price touching Bollinger Bands",
            parameters: vec![
                int_param("period", 20, 5, 50, "BB period"),
                float_param("std_dev", 2.0, 1.0, 4.0, "Standard deviation multiplier"),
            ],
        },
    ]
}
