//! Analysis context — the partial-result carrier for one run.
//!
//! Each stage owns exactly one slot. A slot stays `None` when its stage
//! failed or was gated off; consumers check presence explicitly.

use serde::{Deserialize, Serialize};

use crate::domain::Candle;
use crate::stages::{IndicatorResult, PatternResult, RiskResult, TrendResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub candles: Vec<Candle>,
    pub indicator: Option<IndicatorResult>,
    pub pattern: Option<PatternResult>,
    pub trend: Option<TrendResult>,
    pub risk: Option<RiskResult>,
}

/// Borrowed view of a context whose four stage slots are all filled.
#[derive(Debug, Clone, Copy)]
pub struct CompleteView<'a> {
    pub indicator: &'a IndicatorResult,
    pub pattern: &'a PatternResult,
    pub trend: &'a TrendResult,
    pub risk: &'a RiskResult,
}

impl AnalysisContext {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self {
            candles,
            ..Self::default()
        }
    }

    /// The three upstream results risk depends on, if all are present.
    pub fn risk_inputs(&self) -> Option<(&IndicatorResult, &PatternResult, &TrendResult)> {
        Some((
            self.indicator.as_ref()?,
            self.pattern.as_ref()?,
            self.trend.as_ref()?,
        ))
    }

    pub fn complete(&self) -> Option<CompleteView<'_>> {
        let (indicator, pattern, trend) = self.risk_inputs()?;
        Some(CompleteView {
            indicator,
            pattern,
            trend,
            risk: self.risk.as_ref()?,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.complete().is_some()
    }
}
