//! Single-flight cache of pipeline reports keyed by candle fingerprint.
//!
//! At most one run is in flight per fingerprint. Callers arriving while a run
//! is in flight block until it finishes and share its `Arc<PipelineReport>`.
//! A run that panics releases its slot so the next caller retries.
//!
//! Finished reports are bounded by `capacity`; the oldest is evicted first.
//! `latest()` always returns the most recent completion, evicted or not.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use signallab_core::{Candle, CandleFingerprint};

use crate::config::PipelineConfig;
use crate::enrichment::PatternEnricher;
use crate::pipeline::{run_pipeline_with, PipelineReport};

/// Finished reports kept by `AnalysisCache::new`.
pub const DEFAULT_CAPACITY: usize = 16;

enum Slot {
    InFlight,
    Ready(Arc<PipelineReport>),
}

#[derive(Default)]
struct CacheState {
    slots: HashMap<CandleFingerprint, Slot>,
    /// Keys of `Ready` slots, oldest first.
    ready_order: VecDeque<CandleFingerprint>,
    latest: Option<Arc<PipelineReport>>,
}

impl CacheState {
    fn store(&mut self, key: &CandleFingerprint, report: &Arc<PipelineReport>, capacity: usize) {
        self.slots.insert(key.clone(), Slot::Ready(Arc::clone(report)));
        self.ready_order.push_back(key.clone());
        self.latest = Some(Arc::clone(report));

        while self.ready_order.len() > capacity {
            if let Some(oldest) = self.ready_order.pop_front() {
                self.slots.remove(&oldest);
                debug!(key = oldest.short(), "cache evicted");
            }
        }
    }
}

pub struct AnalysisCache {
    config: PipelineConfig,
    enricher: Option<Box<dyn PatternEnricher>>,
    capacity: usize,
    state: Mutex<CacheState>,
    finished: Condvar,
}

/// Releases an in-flight slot if the run never stored a result.
struct InFlightGuard<'a> {
    cache: &'a AnalysisCache,
    key: &'a CandleFingerprint,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.cache.lock();
            if matches!(state.slots.get(self.key), Some(Slot::InFlight)) {
                state.slots.remove(self.key);
            }
            self.cache.finished.notify_all();
        }
    }
}

impl AnalysisCache {
    pub fn new(config: PipelineConfig, enricher: Option<Box<dyn PatternEnricher>>) -> Self {
        Self::with_capacity(config, enricher, DEFAULT_CAPACITY)
    }

    /// Keep at most `capacity` finished reports (at least one).
    pub fn with_capacity(
        config: PipelineConfig,
        enricher: Option<Box<dyn PatternEnricher>>,
        capacity: usize,
    ) -> Self {
        Self {
            config,
            enricher,
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
            finished: Condvar::new(),
        }
    }

    /// Analyze `candles`, reusing a finished or in-flight run for the same input.
    pub fn analyze(&self, candles: &[Candle]) -> Arc<PipelineReport> {
        let key = CandleFingerprint::of(candles);
        self.get_or_run(&key, || {
            run_pipeline_with(candles, &self.config, self.enricher.as_deref())
        })
    }

    /// Single-flight lookup: `run` executes only if no report for `key` is
    /// stored or in flight.
    pub fn get_or_run<F>(&self, key: &CandleFingerprint, run: F) -> Arc<PipelineReport>
    where
        F: FnOnce() -> PipelineReport,
    {
        {
            let mut state = self.lock();
            loop {
                match state.slots.get(key) {
                    Some(Slot::Ready(report)) => {
                        debug!(key = key.short(), "cache hit");
                        return Arc::clone(report);
                    }
                    Some(Slot::InFlight) => {
                        debug!(key = key.short(), "waiting on in-flight run");
                        state = self
                            .finished
                            .wait(state)
                            .unwrap_or_else(PoisonError::into_inner);
                    }
                    None => {
                        state.slots.insert(key.clone(), Slot::InFlight);
                        break;
                    }
                }
            }
        }

        let mut guard = InFlightGuard {
            cache: self,
            key,
            armed: true,
        };
        let report = Arc::new(run());

        let mut state = self.lock();
        state.store(key, &report, self.capacity);
        guard.armed = false;
        self.finished.notify_all();
        debug!(key = key.short(), "cache filled");
        report
    }

    /// The most recently completed report, if any.
    pub fn latest(&self) -> Option<Arc<PipelineReport>> {
        self.lock().latest.clone()
    }

    /// Number of finished reports held.
    pub fn len(&self) -> usize {
        self.lock().ready_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every finished report. In-flight runs are left alone.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.slots.retain(|_, slot| matches!(slot, Slot::InFlight));
        state.ready_order.clear();
        state.latest = None;
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
