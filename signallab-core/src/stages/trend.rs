//! Trend stage — direction and strength from a fast/slow EMA pair.
//!
//! Up when fast > slow × (1 + deadband), Down when fast < slow × (1 − deadband),
//! otherwise Sideways. Strength is the fractional EMA gap scaled so that a
//! gap of `FULL_STRENGTH_GAP` or more reads as 1.0.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{closes, Candle};
use crate::error::{ensure_finite, Reads, Stage, StageError};
use crate::indicators::ema;
use crate::params::AnalysisParams;

/// Fractional EMA gap that maps to full strength.
pub const FULL_STRENGTH_GAP: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Up,
    Down,
    Sideways,
}

impl TrendDirection {
    /// Classify a fast/slow pair against a fractional deadband.
    pub fn classify(fast: f64, slow: f64, deadband: f64) -> Self {
        if fast > slow * (1.0 + deadband) {
            TrendDirection::Up
        } else if fast < slow * (1.0 - deadband) {
            TrendDirection::Down
        } else {
            TrendDirection::Sideways
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendDirection::Up => "Up",
            TrendDirection::Down => "Down",
            TrendDirection::Sideways => "Sideways",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub trend: TrendDirection,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub strength: f64,
}

/// Trend stage with the default parameters.
pub fn compute_trend(candles: &[Candle]) -> Result<TrendResult, StageError> {
    compute_trend_with(candles, &AnalysisParams::default())
}

pub fn compute_trend_with(
    candles: &[Candle],
    params: &AnalysisParams,
) -> Result<TrendResult, StageError> {
    if candles.is_empty() {
        return Err(StageError::EmptyInput { stage: Stage::Trend });
    }
    ensure_finite(Stage::Trend, candles, 0, Reads::Close)?;

    let closes = closes(candles);
    let fast = ema(&closes, params.ema_fast);
    let slow = ema(&closes, params.ema_slow);
    if slow.is_nan() || slow <= 0.0 {
        return Err(StageError::computation(
            Stage::Trend,
            format!("slow EMA is not positive ({slow})"),
        ));
    }

    let gap = (fast - slow).abs() / slow;
    Ok(TrendResult {
        trend: TrendDirection::classify(fast, slow, params.trend_deadband),
        ema_fast: fast,
        ema_slow: slow,
        strength: (gap / FULL_STRENGTH_GAP).min(1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::candles_from_closes;

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(
            compute_trend(&[]).unwrap_err(),
            StageError::EmptyInput { stage: Stage::Trend }
        );
    }

    #[test]
    fn classify_respects_deadband() {
        assert_eq!(TrendDirection::classify(100.2, 100.0, 0.001), TrendDirection::Up);
        assert_eq!(TrendDirection::classify(100.05, 100.0, 0.001), TrendDirection::Sideways);
        assert_eq!(TrendDirection::classify(99.95, 100.0, 0.001), TrendDirection::Sideways);
        assert_eq!(TrendDirection::classify(99.8, 100.0, 0.001), TrendDirection::Down);
    }

    #[test]
    fn steady_rise_is_up() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let result = compute_trend(&candles_from_closes(&closes)).unwrap();
        assert_eq!(result.trend, TrendDirection::Up);
        assert!(result.ema_fast > result.ema_slow);
        assert!(result.strength > 0.0 && result.strength <= 1.0);
    }

    #[test]
    fn steady_fall_is_down() {
        let closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        let result = compute_trend(&candles_from_closes(&closes)).unwrap();
        assert_eq!(result.trend, TrendDirection::Down);
    }

    #[test]
    fn flat_is_sideways_with_zero_strength() {
        let result = compute_trend(&candles_from_closes(&[50.0; 30])).unwrap();
        assert_eq!(result.trend, TrendDirection::Sideways);
        assert_eq!(result.strength, 0.0);
    }

    #[test]
    fn strength_saturates() {
        let mut closes = vec![100.0; 26];
        closes.extend(vec![200.0; 10]);
        let result = compute_trend(&candles_from_closes(&closes)).unwrap();
        assert_eq!(result.strength, 1.0);
    }

    #[test]
    fn non_positive_prices_fail() {
        let err = compute_trend(&candles_from_closes(&[0.0; 30])).unwrap_err();
        assert_eq!(err.stage(), Stage::Trend);
    }
}
