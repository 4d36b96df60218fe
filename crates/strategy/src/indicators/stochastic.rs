use serde::Serialize;

use super::Series;

/// %K and %D lines, index-aligned with the input.
#[derive(Debug, Clone, Serialize)]
pub struct StochasticSeries {
    pub k: Series,
    pub d: Series,
}

/// Stochastic oscillator.
///
/// %K[i] = 100 × (close[i] − lowest low) / (highest high − lowest low) over
/// the trailing `k_period` window; a degenerate window (highest high ==
/// lowest low) yields 50.0 rather than dividing by zero. %D is the simple
/// mean of the trailing `d_period` %K values. Requires parallel high/low/
/// close slices of equal length; shorter than `k_period + d_period - 1`
/// yields all-undefined lines.
pub fn stochastic(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    k_period: usize,
    d_period: usize,
) -> StochasticSeries {
    assert!(k_period >= 1 && d_period >= 1, "Stochastic periods must be >= 1");
    assert!(
        high.len() == low.len() && low.len() == close.len(),
        "high/low/close series must have equal length"
    );

    let len = close.len();
    if len < k_period + d_period - 1 {
        return StochasticSeries {
            k: vec![None; len],
            d: vec![None; len],
        };
    }

    let mut k: Series = vec![None; len];
    for i in k_period - 1..len {
        let window = i + 1 - k_period..=i;
        let highest = high[window.clone()].iter().cloned().fold(f64::MIN, f64::max);
        let lowest = low[window].iter().cloned().fold(f64::MAX, f64::min);

        k[i] = Some(if highest == lowest {
            50.0
        } else {
            100.0 * (close[i] - lowest) / (highest - lowest)
        });
    }

    let mut d: Series = vec![None; len];
    for i in k_period + d_period - 2..len {
        let window = &k[i + 1 - d_period..=i];
        let sum: f64 = window.iter().flatten().sum();
        d[i] = Some(sum / d_period as f64);
    }

    StochasticSeries { k, d }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stochastic_short_series_is_all_undefined() {
        let data = vec![1.0; 10]; // needs 14 + 3 - 1 = 16
        let out = stochastic(&data, &data, &data, 14, 3);
        assert!(out.k.iter().all(|v| v.is_none()));
        assert!(out.d.iter().all(|v| v.is_none()));
    }

    #[test]
    fn degenerate_window_gives_k_of_50() {
        // Flat high == low over the whole window.
        let data = vec![42.0; 20];
        let out = stochastic(&data, &data, &data, 14, 3);
        assert_eq!(out.k[13], Some(50.0));
        assert_eq!(out.k[19], Some(50.0));
        assert_eq!(out.d[19], Some(50.0));
    }

    #[test]
    fn close_at_window_high_gives_k_of_100() {
        let high: Vec<f64> = (0..10).map(|i| 10.0 + i as f64).collect();
        let low: Vec<f64> = high.iter().map(|h| h - 2.0).collect();
        let close = high.clone();
        let out = stochastic(&high, &low, &close, 5, 3);
        assert_eq!(out.k[9], Some(100.0));
    }

    #[test]
    fn d_is_mean_of_trailing_k() {
        let high = [5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let low = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let close = [3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let out = stochastic(&high, &low, &close, 3, 2);
        let expected = (out.k[4].unwrap() + out.k[5].unwrap()) / 2.0;
        assert!((out.d[5].unwrap() - expected).abs() < 1e-12);
    }
}
