//! Analysis parameters shared by every stage.
//!
//! `AnalysisParams::default()` is the canonical configuration: RSI(14),
//! EMA(12)/EMA(26), 70/30 RSI extremes, a 0.1% trend deadband, a 0.1% doji
//! body ratio and the 55–70 / 30–45 RSI bands of the signal rule table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    pub rsi_period: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    /// RSI at or above this value is overbought.
    pub overbought: f64,
    /// RSI at or below this value is oversold.
    pub oversold: f64,
    /// Fractional gap between the EMAs below which the trend is sideways.
    pub trend_deadband: f64,
    /// A body no larger than `doji_body_ratio * close` is a doji.
    pub doji_body_ratio: f64,
    /// Open interval the RSI must sit in for a BUY.
    pub buy_rsi_band: (f64, f64),
    /// Open interval the RSI must sit in for a SELL.
    pub sell_rsi_band: (f64, f64),
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_fast: 12,
            ema_slow: 26,
            overbought: 70.0,
            oversold: 30.0,
            trend_deadband: 0.001,
            doji_body_ratio: 0.001,
            buy_rsi_band: (55.0, 70.0),
            sell_rsi_band: (30.0, 45.0),
        }
    }
}

impl AnalysisParams {
    /// First candle index at which the signal synthesizer may fire.
    pub fn warmup(&self) -> usize {
        self.ema_slow
    }

    /// Check internal consistency. Returns the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.rsi_period == 0 || self.ema_fast == 0 {
            return Err("periods must be >= 1".into());
        }
        if self.ema_fast >= self.ema_slow {
            return Err(format!(
                "ema_fast ({}) must be < ema_slow ({})",
                self.ema_fast, self.ema_slow
            ));
        }
        if self.oversold >= self.overbought {
            return Err(format!(
                "oversold ({}) must be < overbought ({})",
                self.oversold, self.overbought
            ));
        }
        let negative = |v: f64| v.is_nan() || v < 0.0;
        if negative(self.trend_deadband) || negative(self.doji_body_ratio) {
            return Err("trend_deadband and doji_body_ratio must be >= 0".into());
        }
        for (name, (lo, hi)) in [
            ("buy_rsi_band", self.buy_rsi_band),
            ("sell_rsi_band", self.sell_rsi_band),
        ] {
            if lo >= hi {
                return Err(format!("{name} is inverted: ({lo}, {hi})"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = AnalysisParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.warmup(), 26);
    }

    #[test]
    fn rejects_fast_not_below_slow() {
        let params = AnalysisParams {
            ema_fast: 26,
            ..AnalysisParams::default()
        };
        assert!(params.validate().unwrap_err().contains("ema_fast"));
    }

    #[test]
    fn rejects_inverted_band() {
        let params = AnalysisParams {
            buy_rsi_band: (70.0, 55.0),
            ..AnalysisParams::default()
        };
        assert!(params.validate().unwrap_err().contains("buy_rsi_band"));
    }

    #[test]
    fn rejects_nan_deadband() {
        let params = AnalysisParams {
            trend_deadband: f64::NAN,
            ..AnalysisParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let params: AnalysisParams = serde_json::from_str(r#"{"rsi_period": 7}"#).unwrap();
        assert_eq!(params.rsi_period, 7);
        assert_eq!(params.ema_slow, 26);
    }
}
