//! Pipeline orchestrator — one analysis run over an immutable candle slice.
//!
//! 1. Fan-out: indicator, pattern and trend run concurrently (`rayon::join`).
//!    Enrichment, when configured, runs inside the pattern branch.
//! 2. Gate: risk runs only when all three upstream results are present.
//! 3. Signal synthesis runs unconditionally on the raw candles.
//! 4. The narrative is rendered last.
//!
//! A run always yields a report. Stage failures, including those caused by an
//! empty candle sequence, are collected as `StageError`s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use signallab_core::signals::synthesize_signals_with;
use signallab_core::stages::{compute_indicator_with, compute_pattern_with, compute_trend_with};
use signallab_core::{
    compute_risk, render_narrative, AnalysisContext, AnalysisParams, Candle, PatternResult,
    SignalEvent, Stage, StageError, VisualSeries,
};

use crate::config::PipelineConfig;
use crate::enrichment::{truncate_summary, PatternEnricher};

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub context: AnalysisContext,
    pub narrative: String,
    /// Absent only when signal synthesis itself failed.
    pub visuals: Option<VisualSeries>,
    pub signals: Vec<SignalEvent>,
    pub errors: Vec<StageError>,
}

impl PipelineReport {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty() && self.context.is_complete()
    }

    /// Errors rendered as `"<stage>: <message>"`.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Run with default parameters and no enrichment.
pub fn run_pipeline(candles: &[Candle]) -> PipelineReport {
    run_pipeline_with(candles, &PipelineConfig::default(), None)
}

pub fn run_pipeline_with(
    candles: &[Candle],
    config: &PipelineConfig,
    enricher: Option<&dyn PatternEnricher>,
) -> PipelineReport {
    run_pipeline_at(candles, config, enricher, Utc::now())
}

/// Same as `run_pipeline_with`, with an explicit narrative timestamp.
pub fn run_pipeline_at(
    candles: &[Candle],
    config: &PipelineConfig,
    enricher: Option<&dyn PatternEnricher>,
    generated_at: DateTime<Utc>,
) -> PipelineReport {
    let params = &config.analysis;

    let (indicator, (pattern, trend)) = rayon::join(
        || compute_indicator_with(candles, params),
        || {
            rayon::join(
                || run_pattern(candles, params, enricher),
                || compute_trend_with(candles, params),
            )
        },
    );

    let mut ctx = AnalysisContext::new(candles.to_vec());
    let mut errors = Vec::new();
    ctx.indicator = record(Stage::Indicator, indicator, &mut errors);
    ctx.pattern = record(Stage::Pattern, pattern, &mut errors);
    ctx.trend = record(Stage::Trend, trend, &mut errors);

    if let Some((i, p, t)) = ctx.risk_inputs() {
        let risk = compute_risk(i, p, t);
        ctx.risk = record(Stage::Risk, risk, &mut errors);
    } else {
        debug!(stage = %Stage::Risk, "stage skipped: upstream result missing");
    }

    let synthesized = synthesize_signals_with(candles, params);
    let (visuals, signals) = match record(Stage::Signals, synthesized, &mut errors) {
        Some(report) => (Some(report.visuals), report.signals),
        None => (None, Vec::new()),
    };

    let narrative = render_narrative(&ctx, generated_at);

    info!(
        candles = candles.len(),
        signals = signals.len(),
        errors = errors.len(),
        complete = ctx.is_complete(),
        "pipeline run complete"
    );

    PipelineReport {
        context: ctx,
        narrative,
        visuals,
        signals,
        errors,
    }
}

/// Pattern stage plus the optional, failure-tolerant summary call.
fn run_pattern(
    candles: &[Candle],
    params: &AnalysisParams,
    enricher: Option<&dyn PatternEnricher>,
) -> Result<PatternResult, StageError> {
    let mut result = compute_pattern_with(candles, params)?;
    if let Some(enricher) = enricher {
        match enricher.summarize(candles, &result) {
            Ok(summary) => {
                let summary = truncate_summary(&summary);
                result.ai_summary = (!summary.is_empty()).then_some(summary);
            }
            Err(e) => debug!(enricher = enricher.name(), error = %e, "enrichment skipped"),
        }
    }
    Ok(result)
}

fn record<T>(
    stage: Stage,
    result: Result<T, StageError>,
    errors: &mut Vec<StageError>,
) -> Option<T> {
    match result {
        Ok(value) => {
            debug!(stage = %stage, "stage complete");
            Some(value)
        }
        Err(e) => {
            warn!(stage = %stage, error = %e, "stage failed");
            errors.push(e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::EnrichmentError;
    use chrono::TimeZone;
    use signallab_core::synthetic::random_walk;
    use signallab_core::{CandlePattern, INCOMPLETE_ANALYSIS};

    /// Returns its text verbatim, with no truncation of its own.
    struct Fixed(String);

    impl PatternEnricher for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn summarize(&self, _: &[Candle], _: &PatternResult) -> Result<String, EnrichmentError> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl PatternEnricher for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn summarize(&self, _: &[Candle], _: &PatternResult) -> Result<String, EnrichmentError> {
            Err(EnrichmentError::Status(503))
        }
    }

    fn with(enricher: &dyn PatternEnricher, candles: &[Candle]) -> PipelineReport {
        run_pipeline_with(candles, &PipelineConfig::default(), Some(enricher))
    }

    #[test]
    fn empty_input_is_a_degenerate_report() {
        let report = run_pipeline(&[]);

        let stages: Vec<Stage> = report.errors.iter().map(StageError::stage).collect();
        assert_eq!(stages, vec![Stage::Indicator, Stage::Trend]);
        assert_eq!(
            report.error_messages()[0],
            "indicator: no candles supplied"
        );

        let pattern = report.context.pattern.as_ref().unwrap();
        assert_eq!(pattern.pattern, CandlePattern::None);
        assert_eq!(pattern.strength, 0.0);
        assert!(report.context.risk.is_none());
        assert!(report.signals.is_empty());
        assert!(report.visuals.as_ref().is_some_and(VisualSeries::is_empty));
        assert_eq!(report.narrative, INCOMPLETE_ANALYSIS);
    }

    #[test]
    fn healthy_run_is_complete() {
        let candles = random_walk(60, 3, 100.0);
        let report = run_pipeline(&candles);
        assert!(report.is_complete());
        assert!(report.errors.is_empty());
        assert_eq!(report.visuals.as_ref().map(VisualSeries::len), Some(60));
        assert_eq!(report.narrative.lines().count(), 5);
    }

    #[test]
    fn narrative_uses_given_timestamp() {
        let candles = random_walk(40, 9, 50.0);
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let report = run_pipeline_at(&candles, &PipelineConfig::default(), None, at);
        assert!(report.narrative.starts_with("Time: 2024-03-01T12:00:00Z\n"));
    }

    #[test]
    fn nan_close_fails_every_reading_stage() {
        let mut candles = random_walk(40, 1, 100.0);
        candles[39].close = f64::NAN;
        let report = run_pipeline(&candles);

        let stages: Vec<Stage> = report.errors.iter().map(StageError::stage).collect();
        assert_eq!(
            stages,
            vec![Stage::Indicator, Stage::Pattern, Stage::Trend, Stage::Signals]
        );
        assert!(report.context.risk.is_none());
        assert!(report.visuals.is_none());
        assert!(report.signals.is_empty());
        assert_eq!(report.narrative, INCOMPLETE_ANALYSIS);
    }

    #[test]
    fn enrichment_attaches_summary_only() {
        let candles = random_walk(40, 5, 100.0);
        let plain = run_pipeline(&candles);
        let enriched = with(&Fixed("Indecision.".into()), &candles);

        let (a, b) = (
            plain.context.pattern.unwrap(),
            enriched.context.pattern.unwrap(),
        );
        assert_eq!(a.pattern, b.pattern);
        assert_eq!(a.strength.to_bits(), b.strength.to_bits());
        assert_eq!(b.ai_summary.as_deref(), Some("Indecision."));
        assert_eq!(plain.context.risk, enriched.context.risk);
        assert!(enriched.narrative.contains(". Indecision."));
    }

    #[test]
    fn long_summary_is_clipped_at_attach() {
        let candles = random_walk(40, 5, 100.0);
        let report = with(&Fixed("x".repeat(500)), &candles);
        let summary = report.context.pattern.unwrap().ai_summary.unwrap();
        assert_eq!(summary.chars().count(), crate::enrichment::MAX_SUMMARY_CHARS);
    }

    #[test]
    fn blank_summary_is_dropped() {
        let candles = random_walk(40, 5, 100.0);
        let report = with(&Fixed("   ".into()), &candles);
        assert_eq!(report.context.pattern.unwrap().ai_summary, None);
    }

    #[test]
    fn enrichment_failure_is_swallowed() {
        let candles = random_walk(40, 5, 100.0);
        let report = with(&Failing, &candles);
        assert!(report.errors.is_empty());
        assert_eq!(report.context.pattern.unwrap().ai_summary, None);
    }

    #[test]
    fn error_messages_are_stage_tagged() {
        let mut candles = random_walk(10, 2, 100.0);
        candles[0].close = f64::INFINITY;
        let report = run_pipeline(&candles);
        let messages = report.error_messages();
        assert!(messages.contains(&"indicator: non-finite close at candle 0".to_string()));
        // Pattern only reads the last two candles.
        assert!(report.context.pattern.is_some());
    }
}
