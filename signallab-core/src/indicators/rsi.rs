//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Needs `period + 1` closes (i.e. `period` price changes); anything shorter
//! returns `RSI_NEUTRAL`.
//! Edge cases: avg_loss == 0 → RSI = 100; avg_gain == 0 → RSI = 0; no movement → 50.

/// Value returned when there are not enough closes to seed the averages.
pub const RSI_NEUTRAL: f64 = 50.0;

/// RSI of `closes` evaluated at the last element.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() <= period {
        return RSI_NEUTRAL;
    }

    // Seed: average gain and average loss over the first `period` changes
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for pair in closes[..=period].windows(2) {
        let ch = pair[1] - pair[0];
        if ch > 0.0 {
            avg_gain += ch;
        } else {
            avg_loss -= ch;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    // Wilder smoothing for the remaining changes
    let alpha = 1.0 / period as f64;
    for pair in closes[period..].windows(2) {
        let ch = pair[1] - pair[0];
        let gain = if ch > 0.0 { ch } else { 0.0 };
        let loss = if ch < 0.0 { -ch } else { 0.0 };
        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;
    }

    compute_rsi(avg_gain, avg_loss)
}

/// One RSI value per close, each computed from the prefix ending at that index.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    (1..=closes.len())
        .map(|end| rsi(&closes[..end], period))
        .collect()
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        RSI_NEUTRAL // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
