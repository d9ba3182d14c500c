//! DMA+TD core — candle domain type, moving averages and the entry engine.
//!
//! This crate contains the indicator/signal engine:
//! - Candle domain type and validation
//! - Simple and exponential moving averages tolerant of leading gaps
//! - DMA difference line and its EMA signal line
//! - Bounded buy-setup counter
//! - Rising-edge entry detection and trend-confirmed triggers
//! - Strategy runner producing one record per candle
//!
//! Everything here is a pure function of its inputs: no I/O, no logging.

pub mod domain;
pub mod indicators;
pub mod strategy;

pub use domain::{Candle, CandleError};
pub use strategy::{
    run_strategy, BarResult, DmaTdParams, DmaTdStrategy, ParamOverrides, ParamsError,
    StrategyError, StrategyRun,
};
