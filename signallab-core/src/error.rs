//! Stage identifiers and stage-level errors.
//!
//! A failing stage yields a `StageError`; the pipeline records it and leaves
//! that stage's slot in the context empty. `Display` renders `"<stage>: <message>"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::Candle;

/// The computation stages of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Indicator,
    Pattern,
    Trend,
    Risk,
    Signals,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Indicator => "indicator",
            Stage::Pattern => "pattern",
            Stage::Trend => "trend",
            Stage::Risk => "risk",
            Stage::Signals => "signals",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum StageError {
    #[error("{stage}: no candles supplied")]
    EmptyInput { stage: Stage },

    #[error("{stage}: non-finite {field} at candle {index}")]
    NonFinite {
        stage: Stage,
        field: String,
        index: usize,
    },

    #[error("{stage}: {message}")]
    Computation { stage: Stage, message: String },
}

impl StageError {
    pub fn stage(&self) -> Stage {
        match self {
            StageError::EmptyInput { stage }
            | StageError::NonFinite { stage, .. }
            | StageError::Computation { stage, .. } => *stage,
        }
    }

    pub fn computation(stage: Stage, message: impl Into<String>) -> Self {
        StageError::Computation {
            stage,
            message: message.into(),
        }
    }
}

/// Price fields a stage reads from each candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reads {
    /// Closes only (series math).
    Close,
    /// Open and close (candle bodies).
    Body,
}

impl Reads {
    fn non_finite_field(self, candle: &Candle) -> Option<&'static str> {
        if self == Reads::Body && !candle.open.is_finite() {
            Some("open")
        } else if !candle.close.is_finite() {
            Some("close")
        } else {
            None
        }
    }
}

/// Reject the first candle carrying a NaN or infinite value in a field the
/// stage reads. High, low and volume are never read.
///
/// `offset` is added to the reported index so callers checking a tail slice
/// still report positions in the full sequence.
pub(crate) fn ensure_finite(
    stage: Stage,
    candles: &[Candle],
    offset: usize,
    reads: Reads,
) -> Result<(), StageError> {
    for (i, candle) in candles.iter().enumerate() {
        if let Some(field) = reads.non_finite_field(candle) {
            return Err(StageError::NonFinite {
                stage,
                field: field.to_string(),
                index: offset + i,
            });
        }
    }
    Ok(())
}
