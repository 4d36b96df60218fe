use serde::Serialize;

use super::{sma, Series};

/// Upper/middle/lower Bollinger Bands, index-aligned with the input.
#[derive(Debug, Clone, Serialize)]
pub struct BollingerSeries {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

/// Bollinger Bands.
///
/// Middle band = SMA(period); upper/lower = middle ± `std_dev` × population
/// standard deviation of the trailing window, recomputed per index.
pub fn bollinger_bands(data: &[f64], period: usize, std_dev: f64) -> BollingerSeries {
    assert!(period >= 1, "Bollinger period must be >= 1");

    let middle = sma(data, period);
    let mut upper: Series = vec![None; data.len()];
    let mut lower: Series = vec![None; data.len()];

    for (i, mid) in middle.iter().enumerate() {
        let Some(mid) = mid else { continue };
        let window = &data[i + 1 - period..=i];
        let variance = window
            .iter()
            .map(|v| {
                let d = v - mid;
                d * d
            })
            .sum::<f64>()
            / period as f64;
        let std = variance.sqrt();
        upper[i] = Some(mid + std_dev * std);
        lower[i] = Some(mid - std_dev * std);
    }

    BollingerSeries { upper, middle, lower }
}
