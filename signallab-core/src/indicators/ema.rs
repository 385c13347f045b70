//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1).
//! Seed: SMA of the first `period` closes.
//! Short input (fewer than `period` closes): SMA of every close available.
//! Empty input or a zero period: NaN.

/// EMA of `closes` evaluated at the last element.
pub fn ema(closes: &[f64], period: usize) -> f64 {
    if closes.is_empty() || period == 0 {
        return f64::NAN;
    }

    let seed_len = period.min(closes.len());
    let seed = closes[..seed_len].iter().sum::<f64>() / seed_len as f64;
    if closes.len() <= period {
        return seed;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    closes[period..]
        .iter()
        .fold(seed, |prev, &close| alpha * close + (1.0 - alpha) * prev)
}

/// One EMA value per close, each computed from the prefix ending at that index.
pub fn ema_series(closes: &[f64], period: usize) -> Vec<f64> {
    (1..=closes.len())
        .map(|end| ema(&closes[..end], period))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_close() {
        assert_approx(ema(&[100.0, 200.0, 300.0], 1), 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed SMA(10,11,12) = 11, then 12.0, then 13.0
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0];
        assert_approx(ema(&closes[..3], 3), 11.0, DEFAULT_EPSILON);
        assert_approx(ema(&closes[..4], 3), 12.0, DEFAULT_EPSILON);
        assert_approx(ema(&closes, 3), 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_short_input_is_simple_average() {
        assert_approx(ema(&[10.0, 20.0], 5), 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_empty_or_zero_period_is_nan() {
        assert!(ema(&[], 3).is_nan());
        assert!(ema(&[1.0, 2.0], 0).is_nan());
    }

    #[test]
    fn ema_constant_series_is_constant() {
        let closes = vec![42.0; 40];
        assert_approx(ema(&closes, 12), 42.0, DEFAULT_EPSILON);
        assert_approx(ema(&closes, 26), 42.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_series_matches_prefix_scalar() {
        let closes = [10.0, 11.0, 12.5, 12.0, 14.0, 15.5, 15.0];
        let series = ema_series(&closes, 3);
        assert_eq!(series.len(), closes.len());
        for (i, value) in series.iter().enumerate() {
            assert_eq!(value.to_bits(), ema(&closes[..=i], 3).to_bits());
        }
    }

    #[test]
    fn ema_linear_series_lags_by_half_window() {
        // For a linear ramp the SMA seed already sits at the steady-state lag,
        // (period - 1) / 2 steps behind the latest close.
        let closes: Vec<f64> = (0..40).map(|i| 1.0 + i as f64 * 0.01).collect();
        let last = *closes.last().unwrap();
        assert_approx(ema(&closes, 12), last - 5.5 * 0.01, 1e-9);
        assert_approx(ema(&closes, 26), last - 12.5 * 0.01, 1e-9);
    }
}
