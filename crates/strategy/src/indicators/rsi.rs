use super::Series;

/// Relative Strength Index with Wilder's smoothing.
///
/// Seed average gain/loss is the simple mean of the first `period`
/// consecutive differences; subsequent averages use
/// `avg = (avg * (period - 1) + new) / period`. The first `period` entries
/// are `None`; RSI is 100 exactly when the smoothed average loss is zero.
pub fn rsi(data: &[f64], period: usize) -> Series {
    assert!(period >= 1, "RSI period must be >= 1");

    // One defined value needs `period` differences, i.e. period + 1 points.
    if data.len() < period + 1 {
        return vec![None; data.len()];
    }

    let changes: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = changes[..period]
        .iter()
        .map(|&c| c.max(0.0))
        .sum::<f64>()
        / period as f64;
    let mut avg_loss = changes[..period]
        .iter()
        .map(|&c| (-c).max(0.0))
        .sum::<f64>()
        / period as f64;

    let mut out: Series = vec![None; period];
    out.push(Some(rsi_from_averages(avg_gain, avg_loss)));

    for &change in &changes[period..] {
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        out.push(Some(rsi_from_averages(avg_gain, avg_loss)));
    }

    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}
