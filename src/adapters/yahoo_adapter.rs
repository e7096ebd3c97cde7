//! Yahoo Finance fundamentals adapter.
//!
//! Reads the `quoteSummary` endpoint and picks the `raw` value of each field
//! out of the summaryDetail, defaultKeyStatistics, financialData, price and
//! assetProfile modules. A field found in none of them stays `None`.
//!
//! `quoteSummary` rejects requests without a session, so every fetch first
//! collects the consent cookie from `cookie_url`, then exchanges it for a
//! crumb at `/v1/test/getcrumb` and passes that crumb as a query parameter.

use crate::domain::error::SnapshotError;
use crate::domain::fundamentals::FundamentalsSnapshot;
use crate::ports::fundamentals_port::FundamentalsPort;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";

const MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile";
const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) snaptrader/",
    env!("CARGO_PKG_VERSION")
);

pub struct YahooAdapter {
    base_url: String,
    cookie_url: String,
    client: Client,
}

impl YahooAdapter {
    pub fn new(timeout: Duration) -> Result<Self, SnapshotError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .map_err(|e| {
                SnapshotError::fundamentals(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie_url: DEFAULT_COOKIE_URL.to_string(),
            client,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_cookie_url(mut self, cookie_url: &str) -> Self {
        self.cookie_url = cookie_url.to_string();
        self
    }

    /// Open a session and return its crumb.
    fn crumb(&self) -> Result<String, SnapshotError> {
        // Only the Set-Cookie header matters here; the page itself is usually a 404.
        self.client
            .get(&self.cookie_url)
            .send()
            .map_err(|e| SnapshotError::fundamentals(format!("cookie request failed: {}", e)))?;

        let response = self
            .client
            .get(format!("{}/v1/test/getcrumb", self.base_url))
            .send()
            .map_err(|e| SnapshotError::fundamentals(format!("crumb request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SnapshotError::fundamentals(e.to_string()))?;
        let crumb = body.trim();
        if !status.is_success() || crumb.is_empty() || crumb.starts_with('{') {
            return Err(SnapshotError::fundamentals(format!(
                "no crumb issued (HTTP {}): {}",
                status, crumb
            )));
        }

        debug!("yahoo session established");
        Ok(crumb.to_string())
    }
}

impl FundamentalsPort for YahooAdapter {
    fn fetch_fundamentals(&self, ticker: &str) -> Result<FundamentalsSnapshot, SnapshotError> {
        let crumb = self.crumb()?;
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, ticker);
        info!(ticker, "fetching fundamentals");

        let response = self
            .client
            .get(&url)
            .query(&[("modules", MODULES), ("crumb", crumb.as_str())])
            .send()
            .map_err(|e| SnapshotError::fundamentals(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SnapshotError::fundamentals(e.to_string()))?;

        // An unknown ticker simply has no fundamentals.
        if status == StatusCode::NOT_FOUND {
            warn!(ticker, "no fundamentals found, using defaults");
            return Ok(FundamentalsSnapshot::default());
        }
        if !status.is_success() {
            return Err(SnapshotError::fundamentals(format!("HTTP {}: {}", status, body)));
        }

        parse_quote_summary(ticker, &body)
    }
}

/// Parse a quoteSummary response body.
pub fn parse_quote_summary(
    ticker: &str,
    body: &str,
) -> Result<FundamentalsSnapshot, SnapshotError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| SnapshotError::fundamentals(format!("invalid response: {}", e)))?;

    let summary = &root["quoteSummary"];
    let Some(result) = summary["result"].get(0) else {
        let error = &summary["error"];
        if error.is_null() || error["code"] == "Not Found" {
            warn!(ticker, "no fundamentals found, using defaults");
            return Ok(FundamentalsSnapshot::default());
        }
        return Err(SnapshotError::fundamentals(
            error["description"]
                .as_str()
                .unwrap_or("unexpected error response")
                .to_string(),
        ));
    };

    let raw = |field: &str, modules: &[&str]| -> Option<f64> {
        modules
            .iter()
            .find_map(|m| result[*m][field]["raw"].as_f64())
    };

    let snapshot = FundamentalsSnapshot {
        market_cap: raw("marketCap", &["summaryDetail", "price"]),
        shares_outstanding: raw("sharesOutstanding", &["defaultKeyStatistics"]),
        trailing_pe: raw("trailingPE", &["summaryDetail"]),
        trailing_eps: raw("trailingEps", &["defaultKeyStatistics"]),
        dividend_yield: raw("dividendYield", &["summaryDetail"]),
        payout_ratio: raw("payoutRatio", &["summaryDetail"]),
        beta: raw("beta", &["summaryDetail", "defaultKeyStatistics"]),
        price_to_book: raw("priceToBook", &["defaultKeyStatistics"]),
        debt_to_equity: raw("debtToEquity", &["financialData"]),
        free_cash_flow: raw("freeCashflow", &["financialData"]),
        sector: result["assetProfile"]["sector"]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    };

    debug!(ticker, ?snapshot, "parsed fundamentals");
    Ok(snapshot)
}
