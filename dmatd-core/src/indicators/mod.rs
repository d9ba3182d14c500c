//! Moving-average library.
//!
//! Indicators are pure functions over a numeric sequence. Every output
//! series is aligned 1:1 with its input; a `None` entry means the defining
//! window is not yet populated at that index ("no data yet").

pub mod ema;
pub mod sma;

pub use ema::{ema_of_series, exponential_moving_average};
pub use sma::simple_moving_average;

/// An indicator output aligned with its input sequence.
pub type Series = Vec<Option<f64>>;

/// Arithmetic mean of a non-empty window.
pub(crate) fn mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
