//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values
//!
//! A point is `valid` once the series holds enough history for the indicator's
//! window. Only the final point matters for a snapshot; see [`IndicatorSeries::latest`].

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod volatility;

pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use volatility::annualized_volatility;

use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at the last point, or `None` when the series is empty or still warming up.
    pub fn latest(&self) -> Option<&IndicatorValue> {
        self.values
            .last()
            .filter(|p| p.valid)
            .map(|p| &p.value)
    }

    /// Convenience for single-valued indicators.
    pub fn latest_simple(&self) -> Option<f64> {
        match self.latest() {
            Some(IndicatorValue::Simple(v)) => Some(*v),
            _ => None,
        }
    }
}
