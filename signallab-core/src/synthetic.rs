//! Seeded synthetic candles for demos, benchmarks and tests.
//!
//! A multiplicative random walk: each candle opens at the previous close and
//! moves by up to ±1%, with wicks of up to 0.5% beyond the body.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::Candle;

/// Epoch seconds of the first synthetic candle.
pub const SYNTHETIC_START_TIME: i64 = 1_700_000_000;

/// Spacing between synthetic candles, in seconds.
pub const SYNTHETIC_INTERVAL_SECS: i64 = 3_600;

pub fn random_walk(n: usize, seed: u64, start_price: f64) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut candles = Vec::with_capacity(n);
    let mut prev_close = start_price;

    for i in 0..n {
        let open = prev_close;
        let close = open * (1.0 + rng.gen_range(-0.01..0.01));
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.005));
        let volume = rng.gen_range(1_000.0..5_000.0_f64).round();

        candles.push(Candle {
            time: SYNTHETIC_START_TIME + i as i64 * SYNTHETIC_INTERVAL_SECS,
            open,
            high,
            low,
            close,
            volume,
        });
        prev_close = close;
    }

    candles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_candles() {
        assert_eq!(random_walk(50, 7, 100.0), random_walk(50, 7, 100.0));
        assert_ne!(random_walk(50, 7, 100.0), random_walk(50, 8, 100.0));
    }

    #[test]
    fn candles_are_sane_and_chained() {
        let candles = random_walk(200, 42, 1.2345);
        assert_eq!(candles.len(), 200);
        assert_eq!(candles[0].open, 1.2345);
        for pair in candles.windows(2) {
            assert_eq!(pair[1].open, pair[0].close);
            assert!(pair[1].time > pair[0].time);
        }
        assert!(candles.iter().all(Candle::is_sane));
    }
}
