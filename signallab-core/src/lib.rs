//! SignalLab Core — candle analysis: series math, stages, signal synthesis.
//!
//! This crate contains the deterministic heart of the analyzer:
//! - Domain types (candles)
//! - Series math (Wilder RSI, SMA-seeded EMA)
//! - Four independent stages: indicator, pattern, trend, and risk fusion
//! - Rule-table BUY/SELL signal synthesis with per-candle chart series
//! - The partial-result analysis context and its narrative rendering
//!
//! Nothing here performs I/O or holds shared mutable state; orchestration,
//! configuration files and external services live in `signallab-runner`.

pub mod context;
pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod indicators;
pub mod narrative;
pub mod params;
pub mod signals;
pub mod stages;
pub mod synthetic;

pub use context::AnalysisContext;
pub use domain::Candle;
pub use error::{Stage, StageError};
pub use fingerprint::CandleFingerprint;
pub use narrative::{render_narrative, INCOMPLETE_ANALYSIS};
pub use params::AnalysisParams;
pub use signals::{PatternEvent, SignalEvent, SignalReport, SignalType, VisualSeries};
pub use stages::{
    compute_indicator, compute_pattern, compute_risk, compute_trend, Bias, CandlePattern,
    IndicatorResult, PatternResult, Regime, RiskResult, TrendDirection, TrendResult,
};
