//! Append-only CSV snapshot log.
//!
//! One row per run. The header is written only when the file is missing or
//! empty, so repeated runs against the same path grow a single table.
//! Windowed indicators without enough history are written as empty cells.

use crate::domain::error::SnapshotError;
use crate::domain::metrics::MetricsRecord;
use crate::ports::record_port::RecordPort;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_LOG_FILE: &str = "trade_data.csv";

#[derive(Debug, Serialize)]
struct LogRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Symbol")]
    symbol: &'a str,
    open_price: f64,
    close_price: f64,
    high_price: f64,
    low_price: f64,
    adjusted_close: f64,
    #[serde(rename = "Volume")]
    volume: i64,
    #[serde(rename = "Market_Cap")]
    market_cap: f64,
    #[serde(rename = "PE_Ratio")]
    pe_ratio: f64,
    #[serde(rename = "EPS")]
    eps: f64,
    #[serde(rename = "Dividend_Yield")]
    dividend_yield: f64,
    #[serde(rename = "Dividend_Payout_Ratio")]
    dividend_payout_ratio: f64,
    #[serde(rename = "Beta")]
    beta: f64,
    #[serde(rename = "52_Week_High")]
    week_52_high: f64,
    #[serde(rename = "52_Week_Low")]
    week_52_low: f64,
    #[serde(rename = "SMA_50")]
    sma_50: Option<f64>,
    #[serde(rename = "SMA_200")]
    sma_200: Option<f64>,
    #[serde(rename = "EMA_50")]
    ema_50: Option<f64>,
    #[serde(rename = "Volatility")]
    volatility: Option<f64>,
    #[serde(rename = "RSI")]
    rsi: Option<f64>,
    #[serde(rename = "MACD")]
    macd: Option<f64>,
    #[serde(rename = "PB_Ratio")]
    pb_ratio: f64,
    #[serde(rename = "DE_Ratio")]
    de_ratio: f64,
    #[serde(rename = "Free_Cash_Flow")]
    free_cash_flow: f64,
    #[serde(rename = "Sector")]
    sector: &'a str,
}

impl<'a> LogRow<'a> {
    fn new(symbol: &'a str, r: &'a MetricsRecord) -> Self {
        Self {
            date: r.date.format("%Y-%m-%d").to_string(),
            symbol,
            open_price: r.open_price,
            close_price: r.close_price,
            high_price: r.high_price,
            low_price: r.low_price,
            adjusted_close: r.adjusted_close,
            volume: r.volume,
            market_cap: r.market_cap,
            pe_ratio: r.pe_ratio,
            eps: r.eps,
            dividend_yield: r.dividend_yield,
            dividend_payout_ratio: r.dividend_payout_ratio,
            beta: r.beta,
            week_52_high: r.week_52_high,
            week_52_low: r.week_52_low,
            sma_50: r.sma_50,
            sma_200: r.sma_200,
            ema_50: r.ema_50,
            volatility: r.volatility,
            rsi: r.rsi,
            macd: r.macd,
            pb_ratio: r.pb_ratio,
            de_ratio: r.de_ratio,
            free_cash_flow: r.free_cash_flow,
            sector: &r.sector,
        }
    }
}

pub struct CsvLogAdapter {
    path: PathBuf,
}

impl CsvLogAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn persist_error(&self, reason: impl std::fmt::Display) -> SnapshotError {
        SnapshotError::Persist {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn needs_header(&self) -> bool {
        fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true)
    }
}

impl RecordPort for CsvLogAdapter {
    fn append(&self, symbol: &str, record: &MetricsRecord) -> Result<(), SnapshotError> {
        let write_header = self.needs_header();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.persist_error(e))?;

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        wtr.serialize(LogRow::new(symbol, record))
            .map_err(|e| self.persist_error(e))?;
        wtr.flush().map_err(|e| self.persist_error(e))?;

        if write_header {
            info!(path = %self.path.display(), "created snapshot log");
        }
        debug!(path = %self.path.display(), symbol, date = %record.date, "appended row");
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// Row count and most recent row of an existing log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSummary {
    pub rows: usize,
    pub last: Option<Vec<(String, String)>>,
}

pub fn summarize_log(path: &Path) -> Result<LogSummary, SnapshotError> {
    let read_error = |e: csv::Error| SnapshotError::Persist {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut rdr = csv::Reader::from_path(path).map_err(read_error)?;
    let headers = rdr.headers().map_err(read_error)?.clone();

    let mut rows = 0;
    let mut last = None;
    for result in rdr.records() {
        last = Some(result.map_err(read_error)?);
        rows += 1;
    }

    let last = last.map(|record| {
        headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect()
    });

    Ok(LogSummary { rows, last })
}
