//! Rule-table signal synthesizer.
//!
//! Rebuilds RSI and the EMA pair as full-length series (each point recomputed
//! from its own prefix), classifies every consecutive candle pair, then walks
//! indices `warmup..n`. At most one signal per index; the first rule that
//! matches wins:
//!
//! - BUY: ema_fast > ema_slow × (1 + deadband), RSI strictly inside the buy
//!   band, and a bullish engulfing event at `i` or `i - 1`.
//! - SELL: ema_fast < ema_slow × (1 − deadband), RSI strictly inside the sell
//!   band, and a bearish engulfing event at `i` or `i - 1`.
//!
//! Score is `0.5 + min(0.5, strength × 0.5)` of the matching pattern event.

use tracing::debug;

use super::{PatternEvent, SignalEvent, SignalReport, SignalType, VisualSeries};
use crate::domain::{closes, Candle};
use crate::error::{ensure_finite, Reads, Stage, StageError};
use crate::indicators::{ema_series, rsi_series};
use crate::params::AnalysisParams;
use crate::stages::{classify_pair, CandlePattern};

/// Signal synthesis with the default parameters.
pub fn synthesize_signals(candles: &[Candle]) -> Result<SignalReport, StageError> {
    synthesize_signals_with(candles, &AnalysisParams::default())
}

pub fn synthesize_signals_with(
    candles: &[Candle],
    params: &AnalysisParams,
) -> Result<SignalReport, StageError> {
    ensure_finite(Stage::Signals, candles, 0, Reads::Body)?;

    let closes = closes(candles);
    let rsi = rsi_series(&closes, params.rsi_period);
    let ema_fast = ema_series(&closes, params.ema_fast);
    let ema_slow = ema_series(&closes, params.ema_slow);
    let pattern_events = detect_pattern_events(candles, params);

    // Index → event lookup for the i / i-1 rule.
    let mut by_index: Vec<Option<&PatternEvent>> = vec![None; candles.len()];
    for event in &pattern_events {
        by_index[event.index] = Some(event);
    }

    let (buy_lo, buy_hi) = params.buy_rsi_band;
    let (sell_lo, sell_hi) = params.sell_rsi_band;
    let mut signals = Vec::new();

    for i in params.warmup()..candles.len() {
        let (fast, slow, r) = (ema_fast[i], ema_slow[i], rsi[i]);

        let uptrend = fast > slow * (1.0 + params.trend_deadband);
        if uptrend && buy_lo < r && r < buy_hi {
            if let Some(event) = find_event(&by_index, i, CandlePattern::BullishEngulfing) {
                signals.push(SignalEvent {
                    index: i,
                    time: candles[i].time,
                    signal_type: SignalType::Buy,
                    score: score(event.strength),
                    reason: format!(
                        "uptrend (EMA{} {fast:.4} > EMA{} {slow:.4}), RSI {r:.1} in ({buy_lo}, {buy_hi}), bullish engulfing at candle {}",
                        params.ema_fast, params.ema_slow, event.index
                    ),
                });
                continue;
            }
        }

        let downtrend = fast < slow * (1.0 - params.trend_deadband);
        if downtrend && sell_lo < r && r < sell_hi {
            if let Some(event) = find_event(&by_index, i, CandlePattern::BearishEngulfing) {
                signals.push(SignalEvent {
                    index: i,
                    time: candles[i].time,
                    signal_type: SignalType::Sell,
                    score: score(event.strength),
                    reason: format!(
                        "downtrend (EMA{} {fast:.4} < EMA{} {slow:.4}), RSI {r:.1} in ({sell_lo}, {sell_hi}), bearish engulfing at candle {}",
                        params.ema_fast, params.ema_slow, event.index
                    ),
                });
            }
        }
    }

    debug!(
        candles = candles.len(),
        patterns = pattern_events.len(),
        signals = signals.len(),
        "signal synthesis complete"
    );

    let visuals = VisualSeries {
        time: candles.iter().map(|c| c.time).collect(),
        price: closes,
        rsi,
        ema_fast,
        ema_slow,
        pattern_events,
        signal_events: signals.clone(),
    };

    Ok(SignalReport { signals, visuals })
}

/// Classify every consecutive pair `(i - 1, i)`; `None` classifications are dropped.
pub fn detect_pattern_events(candles: &[Candle], params: &AnalysisParams) -> Vec<PatternEvent> {
    candles
        .windows(2)
        .enumerate()
        .filter_map(|(k, pair)| {
            let (pattern, strength) = classify_pair(&pair[0], &pair[1], params);
            (pattern != CandlePattern::None).then(|| PatternEvent {
                index: k + 1,
                time: pair[1].time,
                pattern,
                strength,
            })
        })
        .collect()
}

/// Event of kind `wanted` at `i`, falling back to `i - 1`.
fn find_event<'a>(
    by_index: &[Option<&'a PatternEvent>],
    i: usize,
    wanted: CandlePattern,
) -> Option<&'a PatternEvent> {
    let matching = |slot: Option<&'a PatternEvent>| slot.filter(|e| e.pattern == wanted);
    matching(by_index[i]).or_else(|| i.checked_sub(1).and_then(|prev| matching(by_index[prev])))
}

fn score(strength: f64) -> f64 {
    0.5 + (strength * 0.5).min(0.5)
}
