//! SignalLab Runner — orchestration and the I/O around the core.
//!
//! This crate builds on `signallab-core` to provide:
//! - The pipeline orchestrator (parallel fan-out, risk gate, signals, narrative)
//! - TOML configuration
//! - Optional pattern enrichment over HTTP
//! - Candle loading from JSON / CSV
//! - A single-flight cache of pipeline reports keyed by candle fingerprint

pub mod cache;
pub mod config;
pub mod enrichment;
pub mod loader;
pub mod pipeline;

pub use cache::AnalysisCache;
pub use config::{ConfigError, EnrichmentConfig, PipelineConfig};
pub use enrichment::{ChatEnricher, EnrichmentError, PatternEnricher};
pub use loader::{load_candles, LoadError};
pub use pipeline::{run_pipeline, run_pipeline_with, run_pipeline_at, PipelineReport};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn report_is_send_sync() {
        assert_send::<PipelineReport>();
        assert_sync::<PipelineReport>();
    }

    #[test]
    fn cache_is_shareable() {
        assert_send::<AnalysisCache>();
        assert_sync::<AnalysisCache>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
        assert_send::<ChatEnricher>();
        assert_sync::<ChatEnricher>();
    }
}
