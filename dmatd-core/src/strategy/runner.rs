//! One forward pass over a candle sequence.
//!
//! Candles are validated up front, the DMA lines are precomputed once, and
//! the bar loop folds a [`DetectorState`] through the sequence. Each bar's
//! record depends only on bars `0..=i`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Candle, CandleError};

use super::detector::DetectorState;
use super::dma::compute_dma_lines;
use super::params::DmaTdParams;
use super::setup::next_setup_count;

/// Errors from a strategy run. No result records are produced on error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("malformed candle at index {index}: {source}")]
    MalformedCandle {
        index: usize,
        #[source]
        source: CandleError,
    },

    #[error("candles out of order at index {index}: {current} does not follow {previous}")]
    OutOfOrder {
        index: usize,
        previous: i64,
        current: i64,
    },
}

/// Everything the strategy derives for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarResult {
    pub timestamp: i64,
    pub close: f64,
    pub dma_line: Option<f64>,
    pub dma_signal: Option<f64>,
    pub bullish_trend: Option<bool>,
    pub setup_count: u8,
    pub entry_signal: bool,
    pub trigger: bool,
}

/// DMA+TD strategy bound to a parameter set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DmaTdStrategy {
    params: DmaTdParams,
}

impl DmaTdStrategy {
    pub fn new(params: DmaTdParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DmaTdParams {
        &self.params
    }

    pub fn run(&self, candles: &[Candle]) -> Result<StrategyRun, StrategyError> {
        run_strategy(candles, &self.params).map(|results| StrategyRun { results })
    }
}

/// Result records of one strategy run, oldest bar first.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRun {
    results: Vec<BarResult>,
}

impl StrategyRun {
    pub fn results(&self) -> &[BarResult] {
        &self.results
    }

    /// Record of the most recent bar.
    pub fn latest(&self) -> Option<&BarResult> {
        self.results.last()
    }

    /// Bars on which the strategy triggered.
    pub fn triggers(&self) -> impl Iterator<Item = &BarResult> {
        self.results.iter().filter(|r| r.trigger)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn into_results(self) -> Vec<BarResult> {
        self.results
    }
}

/// Check every candle before any computation starts.
fn validate_candles(candles: &[Candle]) -> Result<(), StrategyError> {
    for (index, candle) in candles.iter().enumerate() {
        candle
            .validate()
            .map_err(|source| StrategyError::MalformedCandle { index, source })?;
    }
    for (offset, pair) in candles.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(StrategyError::OutOfOrder {
                index: offset + 1,
                previous: pair[0].timestamp,
                current: pair[1].timestamp,
            });
        }
    }
    Ok(())
}

/// Run the strategy over `candles` (oldest first).
///
/// An empty input yields an empty result sequence.
pub fn run_strategy(
    candles: &[Candle],
    params: &DmaTdParams,
) -> Result<Vec<BarResult>, StrategyError> {
    validate_candles(candles)?;

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let lines = compute_dma_lines(&closes, params);

    let mut results = Vec::with_capacity(candles.len());
    let mut state = DetectorState::default();

    for (i, candle) in candles.iter().enumerate() {
        let setup_count = next_setup_count(&closes, i, params.setup_length(), state.prev_count());
        let (next, signal) = state.advance(setup_count, lines.at(i), params.entry_count());
        state = next;

        results.push(BarResult {
            timestamp: candle.timestamp,
            close: candle.close,
            dma_line: lines.difference[i],
            dma_signal: lines.signal[i],
            bullish_trend: signal.bullish_trend,
            setup_count,
            entry_signal: signal.entry_signal,
            trigger: signal.trigger,
        });
    }

    Ok(results)
}
