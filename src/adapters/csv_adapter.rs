//! CSV file history adapter.
//!
//! Reads `{base_path}/{instrument}.csv` with columns
//! `date,open,high,low,close,volume[,oi]`. A `|` in the instrument key is
//! replaced by `_` when building the file name.

use crate::domain::candle::Candle;
use crate::domain::error::SnapshotError;
use crate::ports::history_port::{HistoryPort, Interval};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, instrument: &str) -> PathBuf {
        self.base_path
            .join(format!("{}.csv", instrument.replace('|', "_")))
    }
}

fn parse_field<T>(record: &csv::StringRecord, idx: usize, name: &str) -> Result<T, SnapshotError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    record
        .get(idx)
        .ok_or_else(|| SnapshotError::history(format!("missing {} column", name)))?
        .trim()
        .parse()
        .map_err(|e| SnapshotError::history(format!("invalid {} value: {}", name, e)))
}

impl HistoryPort for CsvAdapter {
    fn fetch_candles(
        &self,
        instrument: &str,
        from: NaiveDate,
        to: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<Candle>, SnapshotError> {
        if interval != Interval::Day {
            warn!(interval = interval.as_str(), "csv history is daily, ignoring interval");
        }

        let path = self.csv_path(instrument);
        let content = fs::read_to_string(&path).map_err(|e| {
            SnapshotError::history(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for result in rdr.records() {
            let record =
                result.map_err(|e| SnapshotError::history(format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| SnapshotError::history("missing date column"))?;
            // Accept bare dates and the timestamps the brokerage API emits.
            let date_part = date_str.get(..10).unwrap_or(date_str);
            let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map_err(|e| SnapshotError::history(format!("invalid date format: {}", e)))?;

            if date < from || date > to {
                continue;
            }

            let open_interest = if record.len() > 6 {
                parse_field(&record, 6, "oi")?
            } else {
                0
            };

            let candle = Candle {
                date,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_field(&record, 5, "volume")?,
                open_interest,
            };
            if let Some((name, value)) = candle.non_finite_price() {
                return Err(SnapshotError::history(format!(
                    "invalid {} value: {} on {}",
                    name, value, date
                )));
            }
            candles.push(candle);
        }

        candles.sort_by_key(|c| c.date);
        debug!(path = %path.display(), count = candles.len(), "loaded candles");
        Ok(candles)
    }
}
