//! Core domain types and logic.

pub mod candle;
pub mod fundamentals;
pub mod indicator;
pub mod metrics;
pub mod error;
