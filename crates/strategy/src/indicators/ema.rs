use super::Series;

/// Exponential moving average.
///
/// Seeded at index `period - 1` with the simple mean of the first `period`
/// values, then `ema[i] = (data[i] - ema[i-1]) * k + ema[i-1]` with
/// `k = 2 / (period + 1)`. Entries before the seed are `None`.
pub fn ema(data: &[f64], period: usize) -> Series {
    assert!(period >= 1, "EMA period must be >= 1");

    if data.len() < period {
        return vec![None; data.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out: Series = vec![None; period - 1];

    let seed = data[..period].iter().sum::<f64>() / period as f64;
    out.push(Some(seed));

    let mut current = seed;
    for &value in &data[period..] {
        current = (value - current) * k + current;
        out.push(Some(current));
    }

    out
}
