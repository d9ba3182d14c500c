//! DMA composite: difference of a fast and slow EMA, plus its EMA signal line.

use crate::indicators::{ema_of_series, exponential_moving_average, Series};

use super::params::DmaTdParams;

/// Difference line and signal line, both aligned with the close series.
#[derive(Debug, Clone, PartialEq)]
pub struct DmaLines {
    pub difference: Series,
    pub signal: Series,
}

impl DmaLines {
    pub fn len(&self) -> usize {
        self.difference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.difference.is_empty()
    }

    /// Both line values at `index`, if both are defined.
    pub fn at(&self, index: usize) -> Option<(f64, f64)> {
        let difference = self.difference.get(index).copied().flatten()?;
        let signal = self.signal.get(index).copied().flatten()?;
        Some((difference, signal))
    }
}

/// Build the difference and signal lines over `closes`.
pub fn compute_dma_lines(closes: &[f64], params: &DmaTdParams) -> DmaLines {
    let fast = ema_of_series(closes, params.fast_length());
    let slow = ema_of_series(closes, params.slow_length());

    let difference: Series = fast
        .iter()
        .zip(&slow)
        .map(|(fast, slow)| match (fast, slow) {
            (Some(fast), Some(slow)) => Some(fast - slow),
            _ => None,
        })
        .collect();

    let signal = exponential_moving_average(&difference, params.signal_length());

    DmaLines { difference, signal }
}
