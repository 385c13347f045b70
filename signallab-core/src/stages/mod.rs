//! The four analysis stages.
//!
//! Indicator, pattern and trend read the candle sequence independently and
//! never share state, so they can run in any order or in parallel. Risk
//! fuses their three results into one recommendation.

pub mod indicator;
pub mod pattern;
pub mod risk;
pub mod trend;

pub use indicator::{compute_indicator, compute_indicator_with, IndicatorResult, Regime};
pub use pattern::{
    classify_pair, compute_pattern, compute_pattern_with, engulfs, CandlePattern, PatternResult,
    DOJI_STRENGTH, ENGULFING_EPSILON,
};
pub use risk::{compute_risk, Bias, RiskResult};
pub use trend::{compute_trend, compute_trend_with, TrendDirection, TrendResult};

#[cfg(test)]
pub(crate) fn candle(time: i64, open: f64, close: f64) -> crate::domain::Candle {
    crate::domain::Candle {
        time,
        open,
        high: open.max(close) + 0.01,
        low: open.min(close) - 0.01,
        close,
        volume: 1000.0,
    }
}

/// Candles whose closes follow `closes`, opening at the previous close.
#[cfg(test)]
pub(crate) fn candles_from_closes(closes: &[f64]) -> Vec<crate::domain::Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            candle(i as i64 * 60, open, close)
        })
        .collect()
}
