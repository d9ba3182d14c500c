//! DMA+TD composite strategy.
//!
//! Data flows one way: closes -> fast/slow EMA -> DMA and signal lines ->
//! per-bar records, with the setup counter and entry detector folded through
//! the bar loop.

pub mod detector;
pub mod dma;
pub mod params;
pub mod runner;
pub mod setup;

pub use detector::{BarSignal, DetectorState};
pub use dma::{compute_dma_lines, DmaLines};
pub use params::{DmaTdParams, ParamOverrides, ParamsError};
pub use runner::{run_strategy, BarResult, DmaTdStrategy, StrategyError, StrategyRun};
pub use setup::{next_setup_count, setup_counts, MAX_SETUP_COUNT};

/// Create synthetic candles from close prices for testing.
///
/// Timestamps are four hours apart; open = prev close, high/low straddle
/// open and close by 1.0.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: 1_704_067_200 + i as i64 * 4 * 3600,
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}
