#![allow(dead_code)]

use chrono::{Days, NaiveDate};
pub use snaptrader::domain::candle::Candle;
use snaptrader::domain::error::SnapshotError;
pub use snaptrader::domain::fundamentals::FundamentalsSnapshot;
use snaptrader::ports::fundamentals_port::FundamentalsPort;
use snaptrader::ports::history_port::{HistoryPort, Interval};
use std::cell::{Cell, RefCell};

pub struct MockHistoryPort {
    pub candles: Vec<Candle>,
    pub error: Option<String>,
    pub calls: RefCell<Vec<(String, NaiveDate, NaiveDate, Interval)>>,
}

impl MockHistoryPort {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self {
            candles,
            error: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            candles: Vec::new(),
            error: Some(reason.to_string()),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl HistoryPort for MockHistoryPort {
    fn fetch_candles(
        &self,
        instrument: &str,
        from: NaiveDate,
        to: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<Candle>, SnapshotError> {
        self.calls
            .borrow_mut()
            .push((instrument.to_string(), from, to, interval));
        match &self.error {
            Some(reason) => Err(SnapshotError::history(reason.clone())),
            None => Ok(self.candles.clone()),
        }
    }
}

pub struct MockFundamentalsPort {
    pub snapshot: FundamentalsSnapshot,
    pub error: Option<String>,
    pub calls: Cell<usize>,
    pub last_ticker: RefCell<Option<String>>,
}

impl MockFundamentalsPort {
    pub fn new(snapshot: FundamentalsSnapshot) -> Self {
        Self {
            snapshot,
            error: None,
            calls: Cell::new(0),
            last_ticker: RefCell::new(None),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            error: Some(reason.to_string()),
            ..Self::new(FundamentalsSnapshot::default())
        }
    }
}

impl FundamentalsPort for MockFundamentalsPort {
    fn fetch_fundamentals(&self, ticker: &str) -> Result<FundamentalsSnapshot, SnapshotError> {
        self.calls.set(self.calls.get() + 1);
        *self.last_ticker.borrow_mut() = Some(ticker.to_string());
        match &self.error {
            Some(reason) => Err(SnapshotError::fundamentals(reason.clone())),
            None => Ok(self.snapshot.clone()),
        }
    }
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

pub fn make_candle(offset: u64, close: f64) -> Candle {
    Candle {
        date: start_date().checked_add_days(Days::new(offset)).unwrap(),
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 100_000 + offset as i64,
        open_interest: 0,
    }
}

pub fn make_candles(prices: &[f64]) -> Vec<Candle> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &close)| make_candle(i as u64, close))
        .collect()
}

/// A gently trending, oscillating series long enough for every indicator.
pub fn realistic_prices(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            2500.0 + t * 1.5 + (t * 0.37).sin() * 40.0 + (t * 0.11).cos() * 25.0
        })
        .collect()
}

pub fn sample_fundamentals() -> FundamentalsSnapshot {
    FundamentalsSnapshot {
        market_cap: Some(1.95e13),
        shares_outstanding: Some(6.77e9),
        trailing_pe: Some(27.8),
        trailing_eps: Some(102.9),
        dividend_yield: Some(0.0034),
        payout_ratio: Some(0.0851),
        beta: Some(0.58),
        price_to_book: Some(2.31),
        debt_to_equity: Some(41.2),
        free_cash_flow: None,
        sector: Some("Energy".into()),
    }
}

pub const YAHOO_CRUMB: &str = "Xq7dVn.0pZ/";

/// Serve the Yahoo consent cookie at `/` and a crumb for requests carrying it.
pub fn mock_yahoo_session(server: &mut mockito::Server) -> (mockito::Mock, mockito::Mock) {
    let cookie = server
        .mock("GET", "/")
        .with_status(404)
        .with_header("set-cookie", "A3=d=AQABBKx; Path=/")
        .create();
    let crumb = server
        .mock("GET", "/v1/test/getcrumb")
        .match_header("cookie", "A3=d=AQABBKx")
        .with_status(200)
        .with_body(YAHOO_CRUMB)
        .create();
    (cookie, crumb)
}
