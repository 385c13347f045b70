//! Risk stage — fuses indicator, pattern and trend into one recommendation.
//!
//! Each input contributes a signed vote scaled by its own confidence:
//!
//! | input     | direction                          | weight | magnitude  |
//! |-----------|------------------------------------|--------|------------|
//! | indicator | Bullish +1 / Bearish −1 / Neutral 0 | 0.4    | confidence |
//! | trend     | Up +1 / Down −1 / Sideways 0        | 0.4    | strength   |
//! | pattern   | engulfing ±1 / Doji, None 0         | 0.2    | strength   |
//!
//! `rho` is the weighted sum, in [-1, 1]. The agreement `|rho|` drives
//! the risk multiplier (0.5–1.5) and the take-profit target (1.5R–3.0R),
//! both strictly increasing in agreement.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::indicator::{IndicatorResult, Regime};
use super::pattern::{CandlePattern, PatternResult};
use super::trend::{TrendDirection, TrendResult};
use crate::error::{Stage, StageError};

const INDICATOR_WEIGHT: f64 = 0.4;
const TREND_WEIGHT: f64 = 0.4;
const PATTERN_WEIGHT: f64 = 0.2;

/// |rho| below this is treated as no directional bias.
pub const FLAT_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bias {
    Long,
    Short,
    Flat,
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bias::Long => "Long",
            Bias::Short => "Short",
            Bias::Flat => "Flat",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub rho: f64,
    pub r_multiplier: f64,
    /// Target in R-multiples.
    pub take_profit: f64,
    pub bias: Bias,
    pub commentary: String,
}

fn regime_sign(regime: Regime) -> f64 {
    match regime {
        Regime::Bullish => 1.0,
        Regime::Bearish => -1.0,
        Regime::Neutral => 0.0,
    }
}

fn trend_sign(trend: TrendDirection) -> f64 {
    match trend {
        TrendDirection::Up => 1.0,
        TrendDirection::Down => -1.0,
        TrendDirection::Sideways => 0.0,
    }
}

fn pattern_sign(pattern: CandlePattern) -> f64 {
    match pattern {
        CandlePattern::BullishEngulfing => 1.0,
        CandlePattern::BearishEngulfing => -1.0,
        CandlePattern::Doji | CandlePattern::None => 0.0,
    }
}

pub fn compute_risk(
    indicator: &IndicatorResult,
    pattern: &PatternResult,
    trend: &TrendResult,
) -> Result<RiskResult, StageError> {
    let inputs = [
        ("indicator confidence", indicator.confidence),
        ("pattern strength", pattern.strength),
        ("trend strength", trend.strength),
    ];
    for (name, value) in inputs {
        if !value.is_finite() {
            return Err(StageError::computation(
                Stage::Risk,
                format!("{name} is not finite ({value})"),
            ));
        }
    }

    let indicator_vote = regime_sign(indicator.regime) * indicator.confidence.clamp(0.0, 1.0);
    let trend_vote = trend_sign(trend.trend) * trend.strength.clamp(0.0, 1.0);
    let pattern_vote = pattern_sign(pattern.pattern) * pattern.strength.clamp(0.0, 1.0);
    let rho = (INDICATOR_WEIGHT * indicator_vote
        + TREND_WEIGHT * trend_vote
        + PATTERN_WEIGHT * pattern_vote)
        .clamp(-1.0, 1.0);

    let agreement = rho.abs();
    let r_multiplier = 0.5 + agreement;
    let take_profit = 1.5 + 1.5 * agreement;

    let bias = if rho >= FLAT_THRESHOLD {
        Bias::Long
    } else if rho <= -FLAT_THRESHOLD {
        Bias::Short
    } else {
        Bias::Flat
    };

    Ok(RiskResult {
        rho,
        r_multiplier,
        take_profit,
        bias,
        commentary: commentary(rho, bias, r_multiplier, take_profit, indicator),
    })
}

fn commentary(
    rho: f64,
    bias: Bias,
    r_multiplier: f64,
    take_profit: f64,
    indicator: &IndicatorResult,
) -> String {
    let conviction = match rho.abs() {
        a if a >= 0.6 => "Strong",
        a if a >= 0.3 => "Moderate",
        _ => "Weak",
    };
    let direction = match bias {
        Bias::Long => "bullish alignment",
        Bias::Short => "bearish alignment",
        Bias::Flat => "mixed signals",
    };

    let mut text = format!(
        "{conviction} {direction} (rho {rho:.2}); risk {r_multiplier:.2}x base size, target {take_profit:.2}R"
    );
    if bias == Bias::Long && indicator.overbought {
        text.push_str("; RSI overbought, consider scaling in");
    } else if bias == Bias::Short && indicator.oversold {
        text.push_str("; RSI oversold, consider scaling in");
    } else if bias == Bias::Flat {
        text.push_str("; stand aside until the stages agree");
    }
    text
}
