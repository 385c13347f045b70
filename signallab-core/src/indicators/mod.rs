//! Series math: RSI and EMA over closing prices.
//!
//! Both primitives are pure functions of the slice they are handed. The
//! `*_series` variants build one value per index by re-running the scalar
//! function on each prefix, so `series[i] == scalar(&closes[..=i])` holds
//! bit for bit.

pub mod ema;
pub mod rsi;

pub use ema::{ema, ema_series};
pub use rsi::{rsi, rsi_series, RSI_NEUTRAL};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
