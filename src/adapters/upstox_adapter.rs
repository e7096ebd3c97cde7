//! Upstox historical candle adapter.
//!
//! `GET {base}/v2/historical-candle/{instrument_key}/{interval}/{to}/{from}` with a
//! bearer access token obtained out of band. The API returns candles newest
//! first as `[timestamp, open, high, low, close, volume, oi]` arrays.

use crate::domain::candle::Candle;
use crate::domain::error::SnapshotError;
use crate::ports::history_port::{HistoryPort, Interval};
use chrono::{DateTime, NaiveDate};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://api.upstox.com";

#[derive(Debug, Deserialize)]
struct CandleResponse {
    status: String,
    #[serde(default)]
    data: Option<CandleData>,
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
struct CandleData {
    #[serde(default)]
    candles: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiError {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    message: String,
}

pub struct UpstoxAdapter {
    base_url: String,
    access_token: String,
    client: Client,
}

impl UpstoxAdapter {
    pub fn new(access_token: &str, timeout: Duration) -> Result<Self, SnapshotError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SnapshotError::history(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.to_string(),
            client,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn candle_url(
        &self,
        instrument: &str,
        from: NaiveDate,
        to: NaiveDate,
        interval: Interval,
    ) -> String {
        format!(
            "{}/v2/historical-candle/{}/{}/{}/{}",
            self.base_url,
            instrument.replace('|', "%7C"),
            interval.as_str(),
            to.format("%Y-%m-%d"),
            from.format("%Y-%m-%d"),
        )
    }
}

impl HistoryPort for UpstoxAdapter {
    fn fetch_candles(
        &self,
        instrument: &str,
        from: NaiveDate,
        to: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<Candle>, SnapshotError> {
        let url = self.candle_url(instrument, from, to, interval);
        info!(instrument, %from, %to, interval = interval.as_str(), "fetching candle history");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| SnapshotError::history(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SnapshotError::history(e.to_string()))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<CandleResponse>(&body)
                .ok()
                .and_then(|r| describe_errors(&r.errors))
                .unwrap_or(body);
            return Err(SnapshotError::history(format!("HTTP {}: {}", status, detail)));
        }

        let candles = parse_candle_response(&body)?;
        debug!(instrument, count = candles.len(), "received candles");
        Ok(candles)
    }
}

fn describe_errors(errors: &[ApiError]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|e| format!("{} {}", e.error_code, e.message).trim().to_string())
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Parse a historical-candle response body into ascending candles.
pub fn parse_candle_response(body: &str) -> Result<Vec<Candle>, SnapshotError> {
    let response: CandleResponse = serde_json::from_str(body)
        .map_err(|e| SnapshotError::history(format!("invalid response: {}", e)))?;

    if response.status != "success" {
        let detail = describe_errors(&response.errors).unwrap_or(response.status);
        return Err(SnapshotError::history(detail));
    }

    let rows = response.data.map(|d| d.candles).unwrap_or_default();
    let mut candles = rows
        .iter()
        .map(|row| parse_candle(row))
        .collect::<Result<Vec<_>, _>>()?;

    candles.sort_by_key(|c| c.date);
    Ok(candles)
}

fn parse_candle(row: &[Value]) -> Result<Candle, SnapshotError> {
    let number = |idx: usize, name: &str| -> Result<f64, SnapshotError> {
        row.get(idx)
            .and_then(Value::as_f64)
            .ok_or_else(|| SnapshotError::history(format!("candle missing {}", name)))
    };

    let timestamp = row
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| SnapshotError::history("candle missing timestamp"))?;

    // Open interest is absent for some segments.
    let open_interest = row.get(6).and_then(Value::as_f64).unwrap_or(0.0);

    Ok(Candle {
        date: parse_timestamp(timestamp)?,
        open: number(1, "open")?,
        high: number(2, "high")?,
        low: number(3, "low")?,
        close: number(4, "close")?,
        volume: number(5, "volume")? as i64,
        open_interest: open_interest as i64,
    })
}

fn parse_timestamp(ts: &str) -> Result<NaiveDate, SnapshotError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Ok(dt.date_naive());
    }
    NaiveDate::parse_from_str(ts.get(..10).unwrap_or(ts), "%Y-%m-%d")
        .map_err(|e| SnapshotError::history(format!("invalid timestamp {:?}: {}", ts, e)))
}
