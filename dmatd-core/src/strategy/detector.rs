//! Per-bar entry detection.
//!
//! A one-bar-lookback state machine over (setup count, trend sign). The entry
//! flag is a rising edge: it fires on the bar where the setup count becomes
//! `entry_count`, never on the bars it stays there. A trigger is an entry on a
//! bar whose DMA line is above its signal line.

/// State carried from one bar to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectorState {
    prev_count: u8,
    prev_at_entry: bool,
}

/// Flags derived for a single bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BarSignal {
    /// `None` until both DMA lines are defined.
    pub bullish_trend: Option<bool>,
    pub entry_signal: bool,
    pub trigger: bool,
}

impl DetectorState {
    /// Setup count of the previous bar (0 before the first bar).
    pub fn prev_count(&self) -> u8 {
        self.prev_count
    }

    /// Whether the previous bar's setup count equalled the entry target.
    pub fn prev_at_entry(&self) -> bool {
        self.prev_at_entry
    }

    /// Advance over one bar.
    ///
    /// `lines` is the (difference, signal) pair when both are defined.
    pub fn advance(
        self,
        setup_count: u8,
        lines: Option<(f64, f64)>,
        entry_count: u8,
    ) -> (DetectorState, BarSignal) {
        let at_entry = setup_count == entry_count;

        let signal = match lines {
            Some((difference, signal)) => {
                let bullish = difference > signal;
                let entry_signal = at_entry && !self.prev_at_entry;
                BarSignal {
                    bullish_trend: Some(bullish),
                    entry_signal,
                    trigger: bullish && entry_signal,
                }
            }
            None => BarSignal::default(),
        };

        let next = DetectorState {
            prev_count: setup_count,
            prev_at_entry: at_entry,
        };
        (next, signal)
    }
}
