//! Sequential market scan.
//!
//! For each symbol: fetch candles, run the strategy, keep the latest record.
//! A failing symbol is recorded and skipped; the scan never aborts. Fetches
//! are paced so consecutive requests stay under the exchange's rate limits.

use std::time::Duration;

use dmatd_core::{BarResult, DmaTdParams, DmaTdStrategy, StrategyError};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use super::provider::{DataError, Interval, KlineProvider};
use super::report::TriggerAlert;

/// Why a single symbol could not be analysed.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] DataError),
    #[error("strategy failed: {0}")]
    Strategy(#[from] StrategyError),
}

/// What happened to one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SymbolOutcome {
    /// Strategy ran; only the most recent bar is kept.
    Analyzed { bars: usize, latest: BarResult },
    /// The provider returned no candles.
    NoData,
    Failed { error: String },
}

impl SymbolOutcome {
    pub fn is_trigger(&self) -> bool {
        matches!(self, SymbolOutcome::Analyzed { latest, .. } if latest.trigger)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolScan {
    pub symbol: String,
    #[serde(flatten)]
    pub outcome: SymbolOutcome,
}

/// Outcome of a whole scan, in the order symbols were scanned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub interval: Interval,
    pub outcomes: Vec<SymbolScan>,
}

impl ScanReport {
    /// Symbols whose most recent bar triggered.
    pub fn triggered(&self) -> Vec<TriggerAlert> {
        self.outcomes
            .iter()
            .filter_map(|scan| match &scan.outcome {
                SymbolOutcome::Analyzed { latest, .. } if latest.trigger => {
                    Some(TriggerAlert::new(&scan.symbol, latest))
                }
                _ => None,
            })
            .collect()
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|scan| match &scan.outcome {
            SymbolOutcome::Failed { error } => Some((scan.symbol.as_str(), error.as_str())),
            _ => None,
        })
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.len() - self.failed_count()
    }

    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.failed_count() == self.outcomes.len()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Progress callback for multi-symbol scans.
pub trait ScanProgress {
    /// Called before a symbol is fetched.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called once a symbol has an outcome.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, outcome: &SymbolOutcome);

    /// Called when every symbol has been scanned.
    fn on_batch_complete(&self, report: &ScanReport);
}

/// Progress reporter that reports nothing.
pub struct NoProgress;

impl ScanProgress for NoProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}

    fn on_complete(&self, _symbol: &str, _index: usize, _total: usize, _outcome: &SymbolOutcome) {}

    fn on_batch_complete(&self, _report: &ScanReport) {}
}

/// Runs the strategy across a list of symbols, one at a time.
pub struct Scanner<'a> {
    provider: &'a dyn KlineProvider,
    strategy: DmaTdStrategy,
    interval: Interval,
    limit: usize,
    pacing: Duration,
}

impl<'a> Scanner<'a> {
    pub fn new(provider: &'a dyn KlineProvider, params: DmaTdParams) -> Self {
        Self {
            provider,
            strategy: DmaTdStrategy::new(params),
            interval: Interval::default(),
            limit: 100,
            pacing: Duration::from_secs(1),
        }
    }

    pub fn interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Fetch and analyse a single symbol.
    pub fn scan_symbol(&self, symbol: &str) -> Result<Option<(usize, BarResult)>, ScanError> {
        let fetched = self.provider.fetch(symbol, self.interval, self.limit)?;
        let run = self.strategy.run(&fetched.candles)?;
        Ok(run.latest().map(|latest| (run.len(), *latest)))
    }

    pub fn scan(&self, symbols: &[String]) -> ScanReport {
        self.scan_with_progress(symbols, &NoProgress)
    }

    pub fn scan_with_progress(&self, symbols: &[String], progress: &dyn ScanProgress) -> ScanReport {
        let total = symbols.len();
        let mut outcomes = Vec::with_capacity(total);

        info!(
            provider = self.provider.name(),
            interval = %self.interval,
            symbols = total,
            "starting scan"
        );

        for (index, symbol) in symbols.iter().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                std::thread::sleep(self.pacing);
            }

            progress.on_start(symbol, index, total);

            let outcome = match self.scan_symbol(symbol) {
                Ok(Some((bars, latest))) => {
                    info!(symbol = %symbol, bars, trigger = latest.trigger, "analyzed");
                    SymbolOutcome::Analyzed { bars, latest }
                }
                Ok(None) => {
                    warn!(symbol = %symbol, "no candles returned");
                    SymbolOutcome::NoData
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "symbol skipped");
                    SymbolOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };

            progress.on_complete(symbol, index, total, &outcome);
            outcomes.push(SymbolScan {
                symbol: symbol.clone(),
                outcome,
            });
        }

        let report = ScanReport {
            interval: self.interval,
            outcomes,
        };
        info!(
            succeeded = report.succeeded_count(),
            failed = report.failed_count(),
            triggered = report.triggered().len(),
            "scan complete"
        );
        progress.on_batch_complete(&report);
        report
    }
}
