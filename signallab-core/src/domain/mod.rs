//! Domain types for SignalLab.

pub mod candle;

pub use candle::{closes, Candle};
