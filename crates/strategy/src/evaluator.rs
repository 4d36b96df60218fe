use serde::Serialize;

use common::{Candle, Error, Result, Signal};

use crate::config::{StrategyConfig, StrategyKind};
use crate::indicators::{
    bollinger_bands, last_defined, macd, prev_defined, rsi, sma, BollingerSeries, MacdSeries,
    Series,
};

/// Structured result of one strategy evaluation: the discrete signal plus
/// the indicator payload behind it, for interactive inspection.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub strategy: String,
    pub pair: String,
    pub signal: Signal,
    pub detail: AnalysisDetail,
}

/// Per-kind indicator payload. All series are index-aligned with the input
/// candles; latest/previous values skip warm-up entries, not zeros.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisDetail {
    MaCrossover {
        fast_ma: Series,
        slow_ma: Series,
        latest_fast: Option<f64>,
        latest_slow: Option<f64>,
        prev_fast: Option<f64>,
        prev_slow: Option<f64>,
    },
    Rsi {
        rsi: Series,
        latest_rsi: Option<f64>,
        prev_rsi: Option<f64>,
    },
    Macd {
        lines: MacdSeries,
        latest_macd: Option<f64>,
        latest_signal: Option<f64>,
        prev_macd: Option<f64>,
        prev_signal: Option<f64>,
    },
    BollingerBands {
        bands: BollingerSeries,
        latest_upper: Option<f64>,
        latest_lower: Option<f64>,
        latest_close: Option<f64>,
        prev_close: Option<f64>,
    },
}

/// Minimum candle count below which evaluation reports
/// `InsufficientHistory` instead of a signal.
pub fn min_history(cfg: &StrategyConfig) -> usize {
    match cfg.kind {
        StrategyKind::MaCrossover => cfg.param_usize("slow_period", 50),
        StrategyKind::Rsi => cfg.param_usize("period", 14),
        StrategyKind::Macd => {
            cfg.param_usize("slow_period", 26) + cfg.param_usize("signal_period", 9)
        }
        StrategyKind::BollingerBands => cfg.param_usize("period", 20),
    }
}

/// Evaluate a strategy against a candle window.
///
/// Signals fire only on an observed transition between the previous and
/// latest defined indicator values; a value merely sitting beyond a
/// threshold never re-triggers. Too little history is an error, not
/// `Neutral` — callers must tell "no signal" from "can't compute".
pub fn analyze(cfg: &StrategyConfig, candles: &[Candle]) -> Result<Analysis> {
    validate_params(cfg)?;

    let required = min_history(cfg);
    if candles.len() < required {
        return Err(Error::InsufficientHistory {
            required,
            actual: candles.len(),
        });
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let (signal, detail) = match cfg.kind {
        StrategyKind::MaCrossover => evaluate_ma_crossover(cfg, &closes),
        StrategyKind::Rsi => evaluate_rsi(cfg, &closes),
        StrategyKind::Macd => evaluate_macd(cfg, &closes),
        StrategyKind::BollingerBands => evaluate_bollinger(cfg, &closes),
    };

    Ok(Analysis {
        strategy: cfg.name.clone(),
        pair: cfg.pair.clone(),
        signal,
        detail,
    })
}

/// Reject parameter combinations the indicator functions cannot compute.
/// Config bounds are advisory only, so a bad TOML entry must surface as a
/// recoverable error here, never reach the indicator preconditions.
fn validate_params(cfg: &StrategyConfig) -> Result<()> {
    let positive = |key: &str, default: usize| -> Result<usize> {
        let value = cfg.param_usize(key, default);
        if value == 0 {
            return Err(Error::ConfigurationMissing(format!(
                "strategy '{}': {key} must be at least 1",
                cfg.name
            )));
        }
        Ok(value)
    };

    match cfg.kind {
        StrategyKind::MaCrossover => {
            let fast = positive("fast_period", 20)?;
            let slow = positive("slow_period", 50)?;
            if fast >= slow {
                return Err(Error::ConfigurationMissing(format!(
                    "strategy '{}': fast_period ({fast}) must be less than slow_period ({slow})",
                    cfg.name
                )));
            }
        }
        StrategyKind::Rsi => {
            positive("period", 14)?;
        }
        StrategyKind::Macd => {
            let fast = positive("fast_period", 12)?;
            let slow = positive("slow_period", 26)?;
            positive("signal_period", 9)?;
            if fast >= slow {
                return Err(Error::ConfigurationMissing(format!(
                    "strategy '{}': fast_period ({fast}) must be less than slow_period ({slow})",
                    cfg.name
                )));
            }
        }
        StrategyKind::BollingerBands => {
            positive("period", 20)?;
        }
    }
    Ok(())
}

/// Signal-only evaluation; same rules and errors as [`analyze`].
pub fn get_signal(cfg: &StrategyConfig, candles: &[Candle]) -> Result<Signal> {
    analyze(cfg, candles).map(|a| a.signal)
}

fn evaluate_ma_crossover(cfg: &StrategyConfig, closes: &[f64]) -> (Signal, AnalysisDetail) {
    let fast_period = cfg.param_usize("fast_period", 20);
    let slow_period = cfg.param_usize("slow_period", 50);

    let fast_ma = sma(closes, fast_period);
    let slow_ma = sma(closes, slow_period);

    let latest_fast = last_defined(&fast_ma);
    let latest_slow = last_defined(&slow_ma);
    let prev_fast = prev_defined(&fast_ma);
    let prev_slow = prev_defined(&slow_ma);

    let signal = match (latest_fast, latest_slow, prev_fast, prev_slow) {
        (Some(lf), Some(ls), Some(pf), Some(ps)) => {
            if lf > ls && pf <= ps {
                Signal::Buy
            } else if lf < ls && pf >= ps {
                Signal::Sell
            } else {
                Signal::Neutral
            }
        }
        _ => Signal::Neutral,
    };

    (
        signal,
        AnalysisDetail::MaCrossover {
            fast_ma,
            slow_ma,
            latest_fast,
            latest_slow,
            prev_fast,
            prev_slow,
        },
    )
}

fn evaluate_rsi(cfg: &StrategyConfig, closes: &[f64]) -> (Signal, AnalysisDetail) {
    let period = cfg.param_usize("period", 14);
    let oversold = cfg.param_f64("oversold", 30.0);
    let overbought = cfg.param_f64("overbought", 70.0);

    let series = rsi(closes, period);
    let latest_rsi = last_defined(&series);
    let prev_rsi = prev_defined(&series);

    let signal = match (latest_rsi, prev_rsi) {
        (Some(latest), Some(prev)) => {
            if latest < oversold && prev >= oversold {
                Signal::Buy
            } else if latest > overbought && prev <= overbought {
                Signal::Sell
            } else {
                Signal::Neutral
            }
        }
        _ => Signal::Neutral,
    };

    (
        signal,
        AnalysisDetail::Rsi {
            rsi: series,
            latest_rsi,
            prev_rsi,
        },
    )
}

fn evaluate_macd(cfg: &StrategyConfig, closes: &[f64]) -> (Signal, AnalysisDetail) {
    let fast = cfg.param_usize("fast_period", 12);
    let slow = cfg.param_usize("slow_period", 26);
    let signal_period = cfg.param_usize("signal_period", 9);

    let lines = macd(closes, fast, slow, signal_period);

    let latest_macd = last_defined(&lines.macd);
    let latest_signal = last_defined(&lines.signal);
    let prev_macd = prev_defined(&lines.macd);
    let prev_signal = prev_defined(&lines.signal);

    let signal = match (latest_macd, latest_signal, prev_macd, prev_signal) {
        (Some(lm), Some(ls), Some(pm), Some(ps)) => {
            if lm > ls && pm <= ps {
                Signal::Buy
            } else if lm < ls && pm >= ps {
                Signal::Sell
            } else {
                Signal::Neutral
            }
        }
        _ => Signal::Neutral,
    };

    (
        signal,
        AnalysisDetail::Macd {
            lines,
            latest_macd,
            latest_signal,
            prev_macd,
            prev_signal,
        },
    )
}

fn evaluate_bollinger(cfg: &StrategyConfig, closes: &[f64]) -> (Signal, AnalysisDetail) {
    let period = cfg.param_usize("period", 20);
    let std_dev = cfg.param_f64("std_dev", 2.0);

    let bands = bollinger_bands(closes, period, std_dev);

    let latest_upper = last_defined(&bands.upper);
    let latest_lower = last_defined(&bands.lower);
    let prev_upper = prev_defined(&bands.upper);
    let prev_lower = prev_defined(&bands.lower);
    let latest_close = closes.last().copied();
    let prev_close = closes.len().checked_sub(2).map(|i| closes[i]);

    let signal = match (
        latest_upper,
        latest_lower,
        latest_close,
        prev_upper,
        prev_lower,
        prev_close,
    ) {
        (Some(lu), Some(ll), Some(lc), Some(pu), Some(pl), Some(pc)) => {
            if lc <= ll && pc > pl {
                Signal::Buy
            } else if lc >= lu && pc < pu {
                Signal::Sell
            } else {
                Signal::Neutral
            }
        }
        _ => Signal::Neutral,
    };

    (
        signal,
        AnalysisDetail::BollingerBands {
            bands,
            latest_upper,
            latest_lower,
            latest_close,
            prev_close,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyConfig;
    use chrono::{Duration, TimeZone, Utc};

    fn candles(closes: &[f64]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::flat(start + Duration::hours(i as i64), c))
            .collect()
    }

    fn ma_config(fast: i64, slow: i64) -> StrategyConfig {
        StrategyConfig::new(StrategyKind::MaCrossover, "ma", "BTC/USDT")
            .with_param("fast_period", fast)
            .with_param("slow_period", slow)
    }

    /// 60 closes: decline 100..62 through index 38, then rise with slope 2.
    /// SMA(3) crosses above SMA(5) exactly at index 40.
    fn cross_at_40() -> Vec<f64> {
        let mut closes: Vec<f64> = (0..=38).map(|i| 100.0 - i as f64).collect();
        closes.extend((1..=21).map(|i| 62.0 + 2.0 * i as f64));
        assert_eq!(closes.len(), 60);
        closes
    }

    #[test]
    fn insufficient_history_is_an_error_not_neutral() {
        let cfg = ma_config(3, 5);
        let err = get_signal(&cfg, &candles(&[1.0, 2.0, 3.0])).unwrap_err();
        match err {
            Error::InsufficientHistory { required, actual } => {
                assert_eq!(required, 5);
                assert_eq!(actual, 3);
            }
            other => panic!("expected InsufficientHistory, got {other:?}"),
        }
    }

    #[test]
    fn inverted_macd_periods_are_a_config_error_not_a_panic() {
        // Bounds in the config file are advisory, so a swapped fast/slow
        // pair must come back as a recoverable error.
        let cfg = StrategyConfig::new(StrategyKind::Macd, "macd", "BTC/USDT")
            .with_param("fast_period", 26i64)
            .with_param("slow_period", 12i64);
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let err = get_signal(&cfg, &candles(&closes)).unwrap_err();
        assert!(matches!(err, Error::ConfigurationMissing(_)), "got {err:?}");
    }

    #[test]
    fn zero_period_is_a_config_error_not_a_panic() {
        let cfg = StrategyConfig::new(StrategyKind::Rsi, "rsi", "BTC/USDT")
            .with_param("period", 0i64);
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let err = get_signal(&cfg, &candles(&closes)).unwrap_err();
        assert!(matches!(err, Error::ConfigurationMissing(_)), "got {err:?}");

        let cfg = ma_config(0, 5);
        let err = get_signal(&cfg, &candles(&closes)).unwrap_err();
        assert!(matches!(err, Error::ConfigurationMissing(_)), "got {err:?}");
    }

    #[test]
    fn ma_crossover_fires_buy_exactly_once_at_the_cross() {
        let cfg = ma_config(3, 5);
        let closes = cross_at_40();
        let all = candles(&closes);

        for i in 4..60 {
            let signal = get_signal(&cfg, &all[..=i]).unwrap();
            if i == 40 {
                assert_eq!(signal, Signal::Buy, "expected BUY at index {i}");
            } else {
                assert_eq!(signal, Signal::Neutral, "unexpected {signal} at index {i}");
            }
        }
    }

    #[test]
    fn ma_crossover_does_not_retrigger_while_fast_stays_above() {
        let cfg = ma_config(3, 5);
        // Sustained uptrend: fast stays above slow the whole time, so the
        // prior <= state is never observed and no signal may fire.
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + 2.0 * i as f64).collect();
        let all = candles(&closes);
        for i in 10..40 {
            assert_eq!(get_signal(&cfg, &all[..=i]).unwrap(), Signal::Neutral);
        }
    }

    #[test]
    fn ma_crossover_sell_on_downward_cross() {
        let cfg = ma_config(3, 5);
        // Mirror of the uptrending fixture: rise then decline.
        let mut closes: Vec<f64> = (0..=38).map(|i| 20.0 + i as f64).collect();
        closes.extend((1..=21).map(|i| 58.0 - 2.0 * i as f64));
        let all = candles(&closes);

        let fired: Vec<usize> = (4..60)
            .filter(|&i| get_signal(&cfg, &all[..=i]).unwrap() == Signal::Sell)
            .collect();
        assert_eq!(fired.len(), 1, "exactly one SELL, got {fired:?}");
    }

    #[test]
    fn rsi_buy_requires_entering_oversold() {
        let cfg = StrategyConfig::new(StrategyKind::Rsi, "rsi", "BTC/USDT")
            .with_param("period", 3i64)
            .with_param("oversold", 30.0)
            .with_param("overbought", 70.0);

        // Gentle oscillation, then one hard drop: RSI moves from neutral
        // territory into oversold on the final candle only.
        let mut closes = vec![100.0, 101.0, 100.0, 101.0, 100.0, 101.0];
        closes.push(80.0);
        let all = candles(&closes);

        let analysis = analyze(&cfg, &all).unwrap();
        assert_eq!(analysis.signal, Signal::Buy);

        // One more falling candle: already oversold, so no second BUY.
        let mut more = closes.clone();
        more.push(70.0);
        assert_eq!(get_signal(&cfg, &candles(&more)).unwrap(), Signal::Neutral);
    }

    #[test]
    fn rsi_sell_requires_entering_overbought() {
        let cfg = StrategyConfig::new(StrategyKind::Rsi, "rsi", "BTC/USDT")
            .with_param("period", 3i64);

        let mut closes = vec![100.0, 99.0, 100.0, 99.0, 100.0, 99.0];
        closes.push(120.0);
        assert_eq!(get_signal(&cfg, &candles(&closes)).unwrap(), Signal::Sell);
    }

    #[test]
    fn macd_buy_on_upward_cross() {
        let cfg = StrategyConfig::new(StrategyKind::Macd, "macd", "BTC/USDT")
            .with_param("fast_period", 3i64)
            .with_param("slow_period", 6i64)
            .with_param("signal_period", 3i64);

        // Decline then sharp reversal: the MACD line crosses up through its
        // signal line once during the recovery.
        let mut closes: Vec<f64> = (0..25).map(|i| 100.0 - i as f64 * 0.5).collect();
        closes.extend((0..25).map(|i| 88.0 + i as f64 * 1.5));
        let all = candles(&closes);

        let buys: Vec<usize> = (9..all.len())
            .filter(|&i| get_signal(&cfg, &all[..=i]).unwrap() == Signal::Buy)
            .collect();
        assert_eq!(buys.len(), 1, "expected one upward cross, got {buys:?}");
    }

    #[test]
    fn macd_zero_values_still_signal() {
        // A flat series has MACD == signal == 0: defined values that simply
        // never cross. They must flow through the comparison, not be
        // treated as missing.
        let cfg = StrategyConfig::new(StrategyKind::Macd, "macd", "BTC/USDT")
            .with_param("fast_period", 3i64)
            .with_param("slow_period", 6i64)
            .with_param("signal_period", 3i64);
        let closes = vec![50.0; 20];
        let analysis = analyze(&cfg, &candles(&closes)).unwrap();
        assert_eq!(analysis.signal, Signal::Neutral);
        match analysis.detail {
            AnalysisDetail::Macd { latest_macd, latest_signal, .. } => {
                assert_eq!(latest_macd, Some(0.0));
                assert_eq!(latest_signal, Some(0.0));
            }
            other => panic!("wrong detail variant: {other:?}"),
        }
    }

    #[test]
    fn bollinger_buy_on_lower_band_pierce() {
        let cfg = StrategyConfig::new(StrategyKind::BollingerBands, "bb", "BTC/USDT")
            .with_param("period", 5i64)
            .with_param("std_dev", 1.5);

        // Mild oscillation, then a drop far through the lower band. With a
        // 5-candle window a lone outlier tops out near 2 population sigmas,
        // so the test band uses 1.5.
        let mut closes = vec![100.0, 101.0, 99.0, 100.0, 101.0, 100.0, 99.0, 101.0];
        closes.push(90.0);
        assert_eq!(get_signal(&cfg, &candles(&closes)).unwrap(), Signal::Buy);

        // Still below the band next candle: no re-trigger.
        closes.push(89.0);
        assert_eq!(get_signal(&cfg, &candles(&closes)).unwrap(), Signal::Neutral);
    }

    #[test]
    fn bollinger_sell_on_upper_band_touch() {
        let cfg = StrategyConfig::new(StrategyKind::BollingerBands, "bb", "BTC/USDT")
            .with_param("period", 5i64)
            .with_param("std_dev", 1.5);

        let mut closes = vec![100.0, 101.0, 99.0, 100.0, 101.0, 100.0, 99.0, 101.0];
        closes.push(112.0);
        assert_eq!(get_signal(&cfg, &candles(&closes)).unwrap(), Signal::Sell);
    }

    #[test]
    fn analysis_carries_aligned_series() {
        let cfg = ma_config(3, 5);
        let closes = cross_at_40();
        let all = candles(&closes);
        let analysis = analyze(&cfg, &all).unwrap();
        match analysis.detail {
            AnalysisDetail::MaCrossover { fast_ma, slow_ma, .. } => {
                assert_eq!(fast_ma.len(), all.len());
                assert_eq!(slow_ma.len(), all.len());
            }
            other => panic!("wrong detail variant: {other:?}"),
        }
    }
}
