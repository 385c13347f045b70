//! Candle fingerprinting — deterministic identity of an input sequence.
//!
//! BLAKE3 over the little-endian bytes of every candle field, in order.
//! Two sequences share a fingerprint iff they are bit-identical, so it is a
//! safe cache key for pipeline results.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Candle;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandleFingerprint(pub String);

impl CandleFingerprint {
    pub fn of(candles: &[Candle]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(candles.len() as u64).to_le_bytes());
        for c in candles {
            hasher.update(&c.time.to_le_bytes());
            for v in [c.open, c.high, c.low, c.close, c.volume] {
                hasher.update(&v.to_bits().to_le_bytes());
            }
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for CandleFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
