//! Buy-setup counter.
//!
//! Counts consecutive bars whose close is below the close `setup_length`
//! bars earlier. The count is capped at [`MAX_SETUP_COUNT`] and drops straight
//! back to zero on the first bar that fails the comparison.

/// Ceiling of the setup count.
pub const MAX_SETUP_COUNT: u8 = 9;

/// Setup count at `index`, given the count at `index - 1` (0 for the first bar).
///
/// Bars without `setup_length` bars of history always count 0.
///
/// # Panics
///
/// Panics if `index` is not a valid position in `closes`.
pub fn next_setup_count(closes: &[f64], index: usize, setup_length: usize, prev_count: u8) -> u8 {
    assert!(
        index < closes.len(),
        "setup index {index} out of range for {} closes",
        closes.len()
    );
    if index < setup_length {
        return 0;
    }
    if closes[index] < closes[index - setup_length] {
        prev_count.saturating_add(1).min(MAX_SETUP_COUNT)
    } else {
        0
    }
}

/// Setup count for every bar of `closes`.
pub fn setup_counts(closes: &[f64], setup_length: usize) -> Vec<u8> {
    let mut counts = Vec::with_capacity(closes.len());
    let mut prev = 0;
    for index in 0..closes.len() {
        prev = next_setup_count(closes, index, setup_length, prev);
        counts.push(prev);
    }
    counts
}
