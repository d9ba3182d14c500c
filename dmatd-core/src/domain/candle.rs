//! Candle — the fundamental market data unit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV candle for a single symbol over one interval.
///
/// `timestamp` is the candle open time in whole seconds since the Unix epoch.
/// Sequences of candles are ordered oldest-first; every indicator in this
/// crate is defined over that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A candle that cannot be fed to the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandleError {
    #[error("candle at {timestamp}: field '{field}' is not a finite number")]
    NonFinite { field: &'static str, timestamp: i64 },
}

impl Candle {
    /// Check that every numeric field holds a finite value.
    pub fn validate(&self) -> Result<(), CandleError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(CandleError::NonFinite {
                    field,
                    timestamp: self.timestamp,
                });
            }
        }
        Ok(())
    }
}
