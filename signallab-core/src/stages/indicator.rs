//! Indicator stage — RSI oscillator and directional regime.
//!
//! Regime rule, applied uniformly:
//! - Bullish: RSI > 50 and EMA-fast > EMA-slow
//! - Bearish: RSI < 50 and EMA-fast < EMA-slow
//! - Neutral: anything else (including exact ties)
//!
//! Confidence is the RSI's distance from the 50 midline, scaled to [0, 1].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{closes, Candle};
use crate::error::{ensure_finite, Reads, Stage, StageError};
use crate::indicators::{ema, rsi, RSI_NEUTRAL};
use crate::params::AnalysisParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Regime::Bullish => "Bullish",
            Regime::Bearish => "Bearish",
            Regime::Neutral => "Neutral",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub rsi: f64,
    pub regime: Regime,
    pub overbought: bool,
    pub oversold: bool,
    pub confidence: f64,
}

impl IndicatorResult {
    /// Output for a single candle: nothing to measure yet.
    fn degenerate() -> Self {
        Self {
            rsi: RSI_NEUTRAL,
            regime: Regime::Neutral,
            overbought: false,
            oversold: false,
            confidence: 0.0,
        }
    }
}

/// Indicator stage with the default parameters.
pub fn compute_indicator(candles: &[Candle]) -> Result<IndicatorResult, StageError> {
    compute_indicator_with(candles, &AnalysisParams::default())
}

pub fn compute_indicator_with(
    candles: &[Candle],
    params: &AnalysisParams,
) -> Result<IndicatorResult, StageError> {
    if candles.is_empty() {
        return Err(StageError::EmptyInput {
            stage: Stage::Indicator,
        });
    }
    ensure_finite(Stage::Indicator, candles, 0, Reads::Close)?;
    if candles.len() < 2 {
        return Ok(IndicatorResult::degenerate());
    }

    let closes = closes(candles);
    let rsi = rsi(&closes, params.rsi_period);
    if !rsi.is_finite() {
        return Err(StageError::computation(
            Stage::Indicator,
            format!("RSI evaluated to {rsi}"),
        ));
    }
    let fast = ema(&closes, params.ema_fast);
    let slow = ema(&closes, params.ema_slow);

    let regime = if rsi > RSI_NEUTRAL && fast > slow {
        Regime::Bullish
    } else if rsi < RSI_NEUTRAL && fast < slow {
        Regime::Bearish
    } else {
        Regime::Neutral
    };

    Ok(IndicatorResult {
        rsi,
        regime,
        overbought: rsi >= params.overbought,
        oversold: rsi <= params.oversold,
        confidence: ((rsi - RSI_NEUTRAL).abs() / RSI_NEUTRAL).clamp(0.0, 1.0),
    })
}
