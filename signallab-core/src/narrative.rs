//! Plain-text narrative of a completed analysis.
//!
//! Five lines in fixed order: time, indicator, pattern, trend, risk. A context
//! missing any stage result renders as `INCOMPLETE_ANALYSIS` instead.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::context::AnalysisContext;

pub const INCOMPLETE_ANALYSIS: &str =
    "Analysis incomplete: one or more stages failed. No recommendation available.";

pub fn render_narrative(ctx: &AnalysisContext, generated_at: DateTime<Utc>) -> String {
    let Some(view) = ctx.complete() else {
        return INCOMPLETE_ANALYSIS.to_string();
    };
    let (indicator, pattern, trend, risk) = (view.indicator, view.pattern, view.trend, view.risk);

    let mut extremes = Vec::new();
    if indicator.overbought {
        extremes.push("overbought");
    }
    if indicator.oversold {
        extremes.push("oversold");
    }
    let extremes = if extremes.is_empty() {
        String::new()
    } else {
        format!(", {}", extremes.join(", "))
    };

    let summary = pattern
        .ai_summary
        .as_deref()
        .map(|s| format!(". {s}"))
        .unwrap_or_default();

    [
        format!("Time: {}", generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        format!(
            "Indicator: RSI {:.2} ({} regime{extremes}), confidence {:.2}",
            indicator.rsi, indicator.regime, indicator.confidence
        ),
        format!(
            "Pattern: {} (strength {:.2}){summary}",
            pattern.pattern, pattern.strength
        ),
        format!(
            "Trend: {} (EMA fast {:.4} / EMA slow {:.4}), strength {:.2}",
            trend.trend, trend.ema_fast, trend.ema_slow, trend.strength
        ),
        format!(
            "Risk: rho {:.2}, R multiplier {:.2}, take profit {:.2}R, bias {}. {}",
            risk.rho, risk.r_multiplier, risk.take_profit, risk.bias, risk.commentary
        ),
    ]
    .join("\n")
}
