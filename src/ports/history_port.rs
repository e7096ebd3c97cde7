//! Candle history source port.

use crate::domain::candle::Candle;
use crate::domain::error::SnapshotError;
use chrono::NaiveDate;

/// Candle interval understood by the history source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Day,
    Week,
    Month,
}

impl Interval {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "day" | "1d" => Some(Interval::Day),
            "week" | "1w" => Some(Interval::Week),
            "month" | "1mo" => Some(Interval::Month),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Day => "day",
            Interval::Week => "week",
            Interval::Month => "month",
        }
    }
}

pub trait HistoryPort {
    /// Candles for `instrument` between `from` and `to` inclusive, ascending by date.
    fn fetch_candles(
        &self,
        instrument: &str,
        from: NaiveDate,
        to: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<Candle>, SnapshotError>;
}
