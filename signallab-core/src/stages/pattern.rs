//! Pattern stage — classifies the last two candles.
//!
//! Checks run in a fixed order and the first hit wins:
//! 1. Doji: last body <= `doji_body_ratio` × last close (strength 0.4)
//! 2. Bullish engulfing: last bullish, previous bearish, last body engulfs previous body
//! 3. Bearish engulfing: last bearish, previous bullish, last body engulfs previous body
//! 4. None (strength 0)
//!
//! Engulfing strength is `min(1, last_body / (prev_body + ε))`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Candle;
use crate::error::{ensure_finite, Reads, Stage, StageError};
use crate::params::AnalysisParams;

/// Strength assigned to every doji.
pub const DOJI_STRENGTH: f64 = 0.4;

/// Guard against a zero-sized previous body.
pub const ENGULFING_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandlePattern {
    BullishEngulfing,
    BearishEngulfing,
    Doji,
    None,
}

impl fmt::Display for CandlePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CandlePattern::BullishEngulfing => "BullishEngulfing",
            CandlePattern::BearishEngulfing => "BearishEngulfing",
            CandlePattern::Doji => "Doji",
            CandlePattern::None => "None",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternResult {
    pub pattern: CandlePattern,
    pub strength: f64,
    /// Optional short narrative attached by an enrichment service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}

impl PatternResult {
    pub fn none() -> Self {
        Self {
            pattern: CandlePattern::None,
            strength: 0.0,
            ai_summary: None,
        }
    }
}

/// True when `a`'s body spans `b`'s body.
pub fn engulfs(a: &Candle, b: &Candle) -> bool {
    a.body_low() <= b.body_low() && a.body_high() >= b.body_high()
}

/// Classify a consecutive candle pair.
pub fn classify_pair(
    prev: &Candle,
    last: &Candle,
    params: &AnalysisParams,
) -> (CandlePattern, f64) {
    let prev_body = prev.body();
    let last_body = last.body();

    if last_body <= params.doji_body_ratio * last.close {
        return (CandlePattern::Doji, DOJI_STRENGTH);
    }

    let strength = (last_body / (prev_body + ENGULFING_EPSILON)).min(1.0);

    if last.is_bullish() && prev.is_bearish() && engulfs(last, prev) {
        return (CandlePattern::BullishEngulfing, strength);
    }
    if last.is_bearish() && prev.is_bullish() && engulfs(last, prev) {
        return (CandlePattern::BearishEngulfing, strength);
    }

    (CandlePattern::None, 0.0)
}

/// Pattern stage with the default parameters.
pub fn compute_pattern(candles: &[Candle]) -> Result<PatternResult, StageError> {
    compute_pattern_with(candles, &AnalysisParams::default())
}

pub fn compute_pattern_with(
    candles: &[Candle],
    params: &AnalysisParams,
) -> Result<PatternResult, StageError> {
    let n = candles.len();
    if n < 2 {
        return Ok(PatternResult::none());
    }

    let tail = &candles[n - 2..];
    ensure_finite(Stage::Pattern, tail, n - 2, Reads::Body)?;

    let (pattern, strength) = classify_pair(&tail[0], &tail[1], params);
    Ok(PatternResult {
        pattern,
        strength,
        ai_summary: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::candle;

    #[test]
    fn fewer_than_two_candles_is_none() {
        assert_eq!(compute_pattern(&[]).unwrap(), PatternResult::none());
        assert_eq!(
            compute_pattern(&[candle(0, 1.0, 1.1)]).unwrap(),
            PatternResult::none()
        );
    }

    #[test]
    fn bullish_engulfing_capped_strength() {
        let prev = candle(0, 1.0, 0.9);
        let last = candle(60, 0.89, 1.02);
        let result = compute_pattern(&[prev, last]).unwrap();
        assert_eq!(result.pattern, CandlePattern::BullishEngulfing);
        assert_eq!(result.strength, 1.0);
    }

    #[test]
    fn bearish_engulfing_equal_bodies() {
        // Equal bodies: the epsilon guard keeps strength just under 1.
        let prev = candle(0, 1.0, 1.1);
        let last = candle(60, 1.1, 1.0);
        let result = compute_pattern(&[prev, last]).unwrap();
        assert_eq!(result.pattern, CandlePattern::BearishEngulfing);
        assert!(result.strength > 0.999 && result.strength <= 1.0);
    }

    #[test]
    fn doji_wins_over_engulfing() {
        // Previous candle is a doji-sized bearish body; last is a tiny bullish
        // body that engulfs it and is itself a doji.
        let prev = candle(0, 100.0, 99.99);
        let last = candle(60, 99.98, 100.05);
        assert!(engulfs(&last, &prev));
        let result = compute_pattern(&[prev, last]).unwrap();
        assert_eq!(result.pattern, CandlePattern::Doji);
        assert_eq!(result.strength, DOJI_STRENGTH);
    }

    #[test]
    fn same_direction_is_none() {
        let prev = candle(0, 1.0, 1.05);
        let last = candle(60, 0.99, 1.2);
        let result = compute_pattern(&[prev, last]).unwrap();
        assert_eq!(result, PatternResult::none());
    }

    #[test]
    fn non_engulfing_reversal_is_none() {
        let prev = candle(0, 1.0, 0.8);
        let last = candle(60, 0.85, 0.95);
        assert_eq!(compute_pattern(&[prev, last]).unwrap().pattern, CandlePattern::None);
    }

    #[test]
    fn only_last_two_candles_matter() {
        let mut candles = vec![candle(0, f64::NAN, 1.0)];
        candles.push(candle(60, 1.0, 0.9));
        candles.push(candle(120, 0.89, 1.02));
        let result = compute_pattern(&candles).unwrap();
        assert_eq!(result.pattern, CandlePattern::BullishEngulfing);
    }

    #[test]
    fn nan_in_tail_is_reported_with_full_index() {
        let mut candles = vec![
            candle(0, 1.0, 1.1),
            candle(60, 1.0, 0.9),
            candle(120, 0.89, 1.02),
        ];
        candles[2].close = f64::NAN;
        let err = compute_pattern(&candles).unwrap_err();
        assert_eq!(err.to_string(), "pattern: non-finite close at candle 2");
    }

    #[test]
    fn zero_previous_body_stays_bounded() {
        let prev = candle(0, 1.0, 1.0);
        let last = candle(60, 0.9, 1.2);
        let (pattern, strength) = classify_pair(&prev, &last, &AnalysisParams::default());
        assert_eq!(pattern, CandlePattern::None);
        assert!(strength.is_finite());
    }
}
