//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = (value[t] - EMA[t-1]) * k + EMA[t-1], k = 2 / (period + 1).
//! Seed: the SMA over the last `period` slots of the prefix ending at the
//! first defined index `i >= period - 1`, with absent slots counted as zero.
//! After that, absent inputs produce absent outputs and leave the recursion
//! state untouched.

use super::{simple_moving_average, Series};

/// Compute the EMA of a series that may contain absent values.
///
/// The output has the same length as `values`. A zero period yields an
/// all-`None` series.
pub fn exponential_moving_average(values: &[Option<f64>], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for (i, value) in values.iter().enumerate() {
        let Some(value) = *value else {
            result.push(None);
            continue;
        };

        let ema = match prev {
            Some(prev) => Some((value - prev) * multiplier + prev),
            None => prefix_seed(&values[..=i], period),
        };

        if ema.is_some() {
            prev = ema;
        }
        result.push(ema);
    }

    result
}

/// SMA of the prefix at its last position; `None` while the prefix is
/// shorter than `period`.
fn prefix_seed(prefix: &[Option<f64>], period: usize) -> Option<f64> {
    let start = prefix.len().checked_sub(period)?;
    let window: Vec<f64> = prefix[start..].iter().map(|v| v.unwrap_or(0.0)).collect();
    simple_moving_average(&window, period).last().copied().flatten()
}

/// EMA of a gap-free series.
pub fn ema_of_series(values: &[f64], period: usize) -> Series {
    let wrapped: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    exponential_moving_average(&wrapped, period)
}
