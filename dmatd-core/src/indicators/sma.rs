//! Simple Moving Average (SMA).
//!
//! Arithmetic mean over a sliding window of `period` values.
//! Lookback: period - 1 (first value at index period-1).

use super::{mean, Series};

/// Compute the SMA of `values`.
///
/// Indices below `period - 1` are `None`. A zero period yields an all-`None`
/// series.
pub fn simple_moving_average(values: &[f64], period: usize) -> Series {
    let mut result = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }

    for (offset, window) in values.windows(period).enumerate() {
        result[offset + period - 1] = Some(mean(window));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let result = simple_moving_average(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0], 5);

        assert_eq!(result.len(), 7);
        for (i, value) in result.iter().take(4).enumerate() {
            assert!(value.is_none(), "expected None at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4].unwrap(), 12.0, DEFAULT_EPSILON);
        assert_approx(result[5].unwrap(), 13.0, DEFAULT_EPSILON);
        assert_approx(result[6].unwrap(), 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_identity() {
        let result = simple_moving_average(&[100.0, 200.0, 300.0], 1);
        assert_eq!(result, vec![Some(100.0), Some(200.0), Some(300.0)]);
    }

    #[test]
    fn sma_too_few_values() {
        let result = simple_moving_average(&[10.0, 11.0], 5);
        assert_eq!(result, vec![None, None]);
    }

    #[test]
    fn sma_zero_period_is_all_none() {
        let result = simple_moving_average(&[10.0, 11.0, 12.0], 0);
        assert!(result.iter().all(Option::is_none));
    }

    #[test]
    fn sma_empty_input() {
        assert!(simple_moving_average(&[], 3).is_empty());
    }
}
