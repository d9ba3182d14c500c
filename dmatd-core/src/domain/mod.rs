//! Domain types for the DMA+TD engine

pub mod candle;

pub use candle::{Candle, CandleError};
