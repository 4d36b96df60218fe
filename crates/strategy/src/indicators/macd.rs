use serde::Serialize;

use super::{ema, Series};

/// The three MACD lines, index-aligned with the input series.
#[derive(Debug, Clone, Serialize)]
pub struct MacdSeries {
    pub macd: Series,
    pub signal: Series,
    pub histogram: Series,
}

impl MacdSeries {
    fn undefined(len: usize) -> Self {
        Self {
            macd: vec![None; len],
            signal: vec![None; len],
            histogram: vec![None; len],
        }
    }
}

/// Moving Average Convergence/Divergence.
///
/// MACD line = EMA(fast) - EMA(slow) wherever both are defined. The signal
/// line is an EMA over the *defined-only* MACD values (the undefined prefix
/// is skipped, not zero-filled), expanded back to full length by position.
/// Histogram = MACD - signal wherever both are defined. A series shorter
/// than `slow + signal` yields an all-undefined bundle.
pub fn macd(data: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    assert!(fast < slow, "MACD fast period must be less than slow period");
    assert!(signal >= 1, "MACD signal period must be >= 1");

    if data.len() < slow + signal {
        return MacdSeries::undefined(data.len());
    }

    let fast_ema = ema(data, fast);
    let slow_ema = ema(data, slow);

    let macd_line: Series = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    // EMA over the defined MACD values only.
    let defined: Vec<f64> = macd_line.iter().flatten().copied().collect();
    if defined.len() < signal {
        return MacdSeries {
            signal: vec![None; data.len()],
            histogram: vec![None; data.len()],
            macd: macd_line,
        };
    }
    let signal_over_defined = ema(&defined, signal);

    // Re-expand by position: the j-th defined MACD entry maps back to the
    // j-th entry of the compacted signal series.
    let mut signal_line: Series = vec![None; data.len()];
    let mut defined_idx = 0;
    for (i, value) in macd_line.iter().enumerate() {
        if value.is_some() {
            signal_line[i] = signal_over_defined[defined_idx];
            defined_idx += 1;
        }
    }

    let histogram: Series = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        })
        .collect();

    MacdSeries {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_short_series_is_all_undefined() {
        let data = vec![100.0; 34]; // needs 26 + 9 = 35
        let out = macd(&data, 12, 26, 9);
        assert!(out.macd.iter().all(|v| v.is_none()));
        assert!(out.signal.iter().all(|v| v.is_none()));
        assert!(out.histogram.iter().all(|v| v.is_none()));
        assert_eq!(out.macd.len(), 34);
    }

    #[test]
    fn macd_line_defined_from_slow_warm_up() {
        let data: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let out = macd(&data, 12, 26, 9);
        assert!(out.macd[..25].iter().all(|v| v.is_none()));
        assert!(out.macd[25..].iter().all(|v| v.is_some()));
    }

    #[test]
    fn macd_signal_skips_undefined_prefix() {
        let data: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let out = macd(&data, 12, 26, 9);
        // Signal seed lands on the 9th defined MACD entry: index 25 + 8.
        assert!(out.signal[..33].iter().all(|v| v.is_none()));
        assert!(out.signal[33..].iter().all(|v| v.is_some()));
    }

    #[test]
    fn histogram_is_difference_where_both_defined() {
        let data: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64).sin() * 5.0).collect();
        let out = macd(&data, 5, 10, 4);
        for i in 0..data.len() {
            match (out.macd[i], out.signal[i], out.histogram[i]) {
                (Some(m), Some(s), Some(h)) => assert!((h - (m - s)).abs() < 1e-12),
                (_, _, None) => {}
                other => panic!("histogram defined without both lines: {other:?}"),
            }
        }
    }

    #[test]
    fn macd_of_constant_series_is_zero_and_defined() {
        // A flat price gives MACD == 0 everywhere after warm-up. Zero is a
        // legitimate defined value, not a missing one.
        let data = vec![100.0; 40];
        let out = macd(&data, 12, 26, 9);
        assert_eq!(out.macd[30], Some(0.0));
        assert_eq!(out.signal[35], Some(0.0));
    }
}
