//! DMA+TD scanner: data providers, scan loop, config and logging around the engine.
//!
//! This crate builds on `dmatd-core` to provide:
//! - Kline providers (Binance USDⓈ-M futures, CSV directories) behind one trait
//! - Circuit breaker and retry/backoff for the exchange
//! - TOML scan configuration with partial strategy parameters
//! - Sequential, paced multi-symbol scanning with per-symbol error isolation
//! - Trigger alerts and logging setup

pub mod binance;
pub mod circuit_breaker;
pub mod config;
pub mod csv_source;
pub mod logging;
pub mod provider;
pub mod report;
pub mod scanner;

pub use binance::BinanceFuturesProvider;
pub use circuit_breaker::CircuitBreaker;
pub use config::{ConfigError, ScanConfig};
pub use csv_source::{read_candles, CsvProvider};
pub use logging::{init_logging, LogFormat};
pub use provider::{DataError, DataSource, FetchResult, Interval, KlineProvider};
pub use report::{format_timestamp, TriggerAlert};
pub use scanner::{NoProgress, ScanError, ScanProgress, ScanReport, Scanner, SymbolOutcome, SymbolScan};
