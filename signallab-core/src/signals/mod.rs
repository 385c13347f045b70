//! Signal synthesis — BUY/SELL events over the whole candle history.
//!
//! Signal events are immutable once emitted: they describe a market event at
//! a candle index, not a downstream trading decision.

pub mod synthesizer;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stages::CandlePattern;

pub use synthesizer::{detect_pattern_events, synthesize_signals, synthesize_signals_with};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Sell,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignalType::Buy => "BUY",
            SignalType::Sell => "SELL",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    /// Candle position in the input sequence.
    pub index: usize,
    pub time: i64,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    /// Conviction in [0.5, 1.0].
    pub score: f64,
    pub reason: String,
}

/// A classified candle pair ending at `index`. `None` classifications are never recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternEvent {
    pub index: usize,
    pub time: i64,
    pub pattern: CandlePattern,
    pub strength: f64,
}

/// Per-candle arrays for charting, all aligned with the input sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualSeries {
    pub time: Vec<i64>,
    pub price: Vec<f64>,
    pub rsi: Vec<f64>,
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub pattern_events: Vec<PatternEvent>,
    pub signal_events: Vec<SignalEvent>,
}

impl VisualSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Output of the synthesizer: the ordered signals plus the chart bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub signals: Vec<SignalEvent>,
    pub visuals: VisualSeries,
}
