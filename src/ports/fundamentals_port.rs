//! Fundamentals source port.

use crate::domain::error::SnapshotError;
use crate::domain::fundamentals::FundamentalsSnapshot;

pub trait FundamentalsPort {
    /// Snapshot for `ticker` in the provider's own ticker convention.
    ///
    /// Absent fields are `None`; only transport or provider failures are errors.
    fn fetch_fundamentals(&self, ticker: &str) -> Result<FundamentalsSnapshot, SnapshotError>;
}

/// Translate a brokerage instrument key (`EXCHANGE_SEGMENT|ISIN`) to a ticker.
///
/// Keeps the part after `|` when present, otherwise the key unchanged.
pub fn ticker_for(instrument: &str) -> &str {
    match instrument.split_once('|') {
        Some((_, ticker)) => ticker,
        None => instrument,
    }
}
