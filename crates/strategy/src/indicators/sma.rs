use super::Series;

/// Simple moving average.
///
/// Entry `i` (for `i >= period - 1`) is the arithmetic mean of the trailing
/// `period` values; earlier entries are `None`. A series shorter than
/// `period` is entirely undefined.
pub fn sma(data: &[f64], period: usize) -> Series {
    assert!(period >= 1, "SMA period must be >= 1");

    if data.len() < period {
        return vec![None; data.len()];
    }

    data.iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < period {
                None
            } else {
                let window = &data[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_short_series_is_all_undefined() {
        let out = sma(&[1.0, 2.0, 3.0], 5);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|v| v.is_none()));
    }

    #[test]
    fn sma_period_one_is_identity() {
        let data = [3.0, 1.0, 4.0, 1.5];
        let out = sma(&data, 1);
        let values: Vec<f64> = out.into_iter().map(|v| v.unwrap()).collect();
        assert_eq!(values, data);
    }

    #[test]
    fn sma_warm_up_then_windowed_mean() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(2.0));
        assert_eq!(out[3], Some(3.0));
    }

    #[test]
    fn sma_length_matches_input() {
        let data: Vec<f64> = (0..37).map(|i| i as f64).collect();
        assert_eq!(sma(&data, 10).len(), data.len());
    }
}
