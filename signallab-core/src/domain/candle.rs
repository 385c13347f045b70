//! Candle — the fundamental market data unit.

use serde::{Deserialize, Serialize};

/// OHLCV candle for a single interval.
///
/// Sequences are chronological by `time` (epoch seconds). Duplicate
/// timestamps are not rejected; every stage works on positions, not times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Absolute body size `|close - open|`.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Lower edge of the body.
    pub fn body_low(&self) -> f64 {
        self.open.min(self.close)
    }

    /// Upper edge of the body.
    pub fn body_high(&self) -> f64 {
        self.open.max(self.close)
    }

    /// Name of the first non-finite price field, if any.
    ///
    /// Volume is not checked: no stage reads it.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        if !self.open.is_finite() {
            Some("open")
        } else if !self.high.is_finite() {
            Some("high")
        } else if !self.low.is_finite() {
            Some("low")
        } else if !self.close.is_finite() {
            Some("close")
        } else {
            None
        }
    }

    /// Basic OHLC sanity check: high >= low and the body sits inside the range.
    pub fn is_sane(&self) -> bool {
        if self.non_finite_field().is_some() {
            return false;
        }
        self.high >= self.low && self.high >= self.body_high() && self.low <= self.body_low()
    }
}

/// Extract closing prices in order.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}
