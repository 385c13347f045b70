//! Shared candle builders for integration tests.

#![allow(dead_code)]

use signallab_core::Candle;

pub fn candle(time: i64, open: f64, close: f64) -> Candle {
    Candle {
        time,
        open,
        high: open.max(close) + 0.01,
        low: open.min(close) - 0.01,
        close,
        volume: 1000.0,
    }
}

/// Candles whose bodies run from the previous close to this close.
pub fn chained(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            candle(i as i64 * 60, open, close)
        })
        .collect()
}

/// Zigzag of `n` closes alternating `first` and `second` moves.
///
/// Each candle carries a 0.2 body ending at its close, on the side it came
/// from, so consecutive bodies never engulf one another. Passing
/// `engulf_at = Some(k)` reopens candle `k` just beyond the previous close,
/// turning `(k - 1, k)` into an engulfing pair.
pub fn zigzag(
    n: usize,
    start: f64,
    first: f64,
    second: f64,
    engulf_at: Option<usize>,
) -> Vec<Candle> {
    let mut closes = vec![start];
    for i in 1..n {
        let step = if i % 2 == 1 { first } else { second };
        closes.push(closes[i - 1] + step);
    }

    let mut candles: Vec<Candle> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let falling = i > 0 && close < closes[i - 1];
            let open = if falling { close + 0.2 } else { close - 0.2 };
            candle(i as i64 * 60, open, close)
        })
        .collect();

    if let Some(k) = engulf_at {
        let prev_close = closes[k - 1];
        let open = if closes[k] > prev_close {
            prev_close - 0.05
        } else {
            prev_close + 0.05
        };
        candles[k] = candle(k as i64 * 60, open, closes[k]);
    }

    candles
}
