//! Strategy parameter set with defaults and validated overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::setup::MAX_SETUP_COUNT;

/// Invalid parameter values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("{name} must be >= 1")]
    ZeroLength { name: &'static str },

    #[error("entry_count must be between 1 and {max}, got {value}", max = MAX_SETUP_COUNT)]
    EntryCountOutOfRange { value: u8 },
}

/// Partial configuration: each recognized option is either supplied or left
/// to its default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamOverrides {
    pub fast_length: Option<usize>,
    pub slow_length: Option<usize>,
    pub signal_length: Option<usize>,
    pub setup_length: Option<usize>,
    pub entry_count: Option<u8>,
}

/// Parameters of one DMA+TD strategy run.
///
/// Construct through [`DmaTdParams::new`] or [`DmaTdParams::with_overrides`];
/// both reject zero lengths and unreachable entry counts. Deserialization
/// goes through [`ParamOverrides`], so a partial table yields a validated,
/// defaulted parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ParamOverrides")]
pub struct DmaTdParams {
    fast_length: usize,
    slow_length: usize,
    signal_length: usize,
    setup_length: usize,
    entry_count: u8,
}

impl Default for DmaTdParams {
    fn default() -> Self {
        Self {
            fast_length: 5,
            slow_length: 20,
            signal_length: 9,
            setup_length: 4,
            entry_count: 1,
        }
    }
}

impl DmaTdParams {
    pub fn new(
        fast_length: usize,
        slow_length: usize,
        signal_length: usize,
        setup_length: usize,
        entry_count: u8,
    ) -> Result<Self, ParamsError> {
        let params = Self {
            fast_length,
            slow_length,
            signal_length,
            setup_length,
            entry_count,
        };
        params.validate()?;
        Ok(params)
    }

    /// Merge overrides onto the defaults, then validate.
    pub fn with_overrides(overrides: ParamOverrides) -> Result<Self, ParamsError> {
        Self::default().merged(overrides)
    }

    /// Merge overrides onto this parameter set, then validate.
    pub fn merged(self, overrides: ParamOverrides) -> Result<Self, ParamsError> {
        Self::new(
            overrides.fast_length.unwrap_or(self.fast_length),
            overrides.slow_length.unwrap_or(self.slow_length),
            overrides.signal_length.unwrap_or(self.signal_length),
            overrides.setup_length.unwrap_or(self.setup_length),
            overrides.entry_count.unwrap_or(self.entry_count),
        )
    }

    fn validate(&self) -> Result<(), ParamsError> {
        let lengths = [
            ("fast_length", self.fast_length),
            ("slow_length", self.slow_length),
            ("signal_length", self.signal_length),
            ("setup_length", self.setup_length),
        ];
        for (name, value) in lengths {
            if value == 0 {
                return Err(ParamsError::ZeroLength { name });
            }
        }
        if self.entry_count == 0 || self.entry_count > MAX_SETUP_COUNT {
            return Err(ParamsError::EntryCountOutOfRange {
                value: self.entry_count,
            });
        }
        Ok(())
    }

    pub fn fast_length(&self) -> usize {
        self.fast_length
    }

    pub fn slow_length(&self) -> usize {
        self.slow_length
    }

    pub fn signal_length(&self) -> usize {
        self.signal_length
    }

    pub fn setup_length(&self) -> usize {
        self.setup_length
    }

    pub fn entry_count(&self) -> u8 {
        self.entry_count
    }

    /// Index of the first bar whose trend flag is defined on gap-free input.
    ///
    /// The signal line seeds on the same bar as the DMA line unless its own
    /// window is longer.
    pub fn warmup_bars(&self) -> usize {
        let dma_start = self.fast_length.max(self.slow_length) - 1;
        dma_start.max(self.signal_length - 1)
    }
}

impl TryFrom<ParamOverrides> for DmaTdParams {
    type Error = ParamsError;

    fn try_from(overrides: ParamOverrides) -> Result<Self, Self::Error> {
        Self::with_overrides(overrides)
    }
}
