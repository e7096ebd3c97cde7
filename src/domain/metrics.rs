//! Snapshot metrics: one record per run from a candle series and a fundamentals snapshot.
//!
//! Windowed indicators are `None` when the series is too short for their
//! window ("insufficient history"). Everything else is always a finite number
//! or a resolved default.

use super::candle::Candle;
use super::error::SnapshotError;
use super::fundamentals::FundamentalsSnapshot;
use super::indicator::macd::{self, latest_histogram};
use super::indicator::{annualized_volatility, calculate_ema, calculate_rsi, calculate_sma};
use chrono::NaiveDate;

pub const SMA_SHORT_PERIOD: usize = 50;
pub const SMA_LONG_PERIOD: usize = 200;
pub const EMA_PERIOD: usize = 50;
pub const RSI_PERIOD: usize = 14;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRecord {
    pub date: NaiveDate,
    pub open_price: f64,
    pub close_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    /// The history source has no split/dividend-adjusted series, so this is the close.
    pub adjusted_close: f64,
    pub volume: i64,
    pub market_cap: f64,
    pub pe_ratio: f64,
    pub eps: f64,
    pub dividend_yield: f64,
    pub dividend_payout_ratio: f64,
    pub beta: f64,
    pub week_52_high: f64,
    pub week_52_low: f64,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub ema_50: Option<f64>,
    pub volatility: Option<f64>,
    pub rsi: Option<f64>,
    /// MACD histogram (line minus signal), not the MACD line.
    pub macd: Option<f64>,
    pub pb_ratio: f64,
    pub de_ratio: f64,
    pub free_cash_flow: f64,
    pub sector: String,
}

impl MetricsRecord {
    /// Names of windowed indicators that could not be computed.
    pub fn insufficient_fields(&self) -> Vec<&'static str> {
        [
            ("SMA_50", self.sma_50),
            ("SMA_200", self.sma_200),
            ("EMA_50", self.ema_50),
            ("Volatility", self.volatility),
            ("RSI", self.rsi),
            ("MACD", self.macd),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Compute the snapshot record for `symbol`.
///
/// `candles` must be ordered by ascending date. Fails only when it is empty.
pub fn compute_metrics(
    symbol: &str,
    candles: &[Candle],
    fundamentals: &FundamentalsSnapshot,
) -> Result<MetricsRecord, SnapshotError> {
    let latest = candles.last().ok_or_else(|| SnapshotError::InsufficientData {
        symbol: symbol.to_string(),
    })?;

    let week_52_high = finite_extreme(candles.iter().map(|c| c.high), f64::max);
    let week_52_low = finite_extreme(candles.iter().map(|c| c.low), f64::min);

    let resolved = fundamentals.resolve(latest.close);

    let macd_series = macd::calculate_macd_default(candles);

    Ok(MetricsRecord {
        date: latest.date,
        open_price: latest.open,
        close_price: latest.close,
        high_price: latest.high,
        low_price: latest.low,
        adjusted_close: latest.close,
        volume: latest.volume,
        market_cap: resolved.market_cap,
        pe_ratio: resolved.pe_ratio,
        eps: resolved.eps,
        dividend_yield: resolved.dividend_yield,
        dividend_payout_ratio: resolved.dividend_payout_ratio,
        beta: resolved.beta,
        week_52_high,
        week_52_low,
        sma_50: finite(calculate_sma(candles, SMA_SHORT_PERIOD).latest_simple()),
        sma_200: finite(calculate_sma(candles, SMA_LONG_PERIOD).latest_simple()),
        ema_50: finite(calculate_ema(candles, EMA_PERIOD).latest_simple()),
        volatility: finite(annualized_volatility(candles)),
        rsi: finite(calculate_rsi(candles, RSI_PERIOD).latest_simple()),
        macd: finite(latest_histogram(&macd_series)),
        pb_ratio: resolved.pb_ratio,
        de_ratio: resolved.de_ratio,
        free_cash_flow: resolved.free_cash_flow,
        sector: resolved.sector,
    })
}

/// A NaN or infinite indicator value is reported as insufficient.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Fold over the finite values only; 0 when there are none.
fn finite_extreme(values: impl Iterator<Item = f64>, pick: fn(f64, f64) -> f64) -> f64 {
    values.filter(|v| v.is_finite()).reduce(pick).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::IndicatorValue;
    use approx::assert_relative_eq;
    use chrono::Days;

    fn make_candles(prices: &[f64]) -> Vec<Candle> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                open: close - 1.0,
                high: close + 2.0,
                low: close - 3.0,
                close,
                volume: 1_000 + i as i64,
                open_interest: 0,
            })
            .collect()
    }

    #[test]
    fn empty_series_is_insufficient_data() {
        let result = compute_metrics("TEST", &[], &FundamentalsSnapshot::default());
        match result {
            Err(SnapshotError::InsufficientData { symbol }) => assert_eq!(symbol, "TEST"),
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }

    #[test]
    fn single_candle_reports_prices_only() {
        let candles = make_candles(&[100.0]);
        let record = compute_metrics("TEST", &candles, &FundamentalsSnapshot::default()).unwrap();

        assert_eq!(record.open_price, 99.0);
        assert_eq!(record.close_price, 100.0);
        assert_eq!(record.high_price, 102.0);
        assert_eq!(record.low_price, 97.0);
        assert_eq!(record.adjusted_close, 100.0);
        assert_eq!(record.volume, 1_000);
        assert_eq!(record.week_52_high, 102.0);
        assert_eq!(record.week_52_low, 97.0);

        assert_eq!(record.sma_50, None);
        assert_eq!(record.sma_200, None);
        assert_eq!(record.ema_50, None);
        assert_eq!(record.volatility, None);
        assert_eq!(record.rsi, None);
        assert_eq!(record.macd, None);
        assert_eq!(record.insufficient_fields().len(), 6);
    }

    #[test]
    fn latest_fields_come_from_last_candle() {
        let candles = make_candles(&[10.0, 20.0, 15.0]);
        let record = compute_metrics("TEST", &candles, &FundamentalsSnapshot::default()).unwrap();

        assert_eq!(record.date, candles[2].date);
        assert_eq!(record.close_price, 15.0);
        assert_eq!(record.volume, 1_002);
    }

    #[test]
    fn week_52_range_spans_whole_series() {
        let candles = make_candles(&[10.0, 50.0, 30.0]);
        let record = compute_metrics("TEST", &candles, &FundamentalsSnapshot::default()).unwrap();

        assert_eq!(record.week_52_high, 52.0);
        assert_eq!(record.week_52_low, 7.0);
    }

    #[test]
    fn constant_series_indicators() {
        let candles = make_candles(&[100.0; 250]);
        let record = compute_metrics("TEST", &candles, &FundamentalsSnapshot::default()).unwrap();

        assert_eq!(record.sma_50, Some(100.0));
        assert_eq!(record.sma_200, Some(100.0));
        assert_eq!(record.ema_50, Some(100.0));
        assert_eq!(record.volatility, Some(0.0));
        assert_eq!(record.rsi, Some(100.0));
        assert_eq!(record.macd, Some(0.0));
        assert!(record.insufficient_fields().is_empty());
    }

    #[test]
    fn medium_series_lacks_only_sma_200() {
        let prices: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let candles = make_candles(&prices);
        let record = compute_metrics("TEST", &candles, &FundamentalsSnapshot::default()).unwrap();

        assert_eq!(record.insufficient_fields(), vec!["SMA_200"]);
        let rsi = record.rsi.unwrap();
        assert!((0.0..=100.0).contains(&rsi));
    }

    #[test]
    fn missing_market_cap_and_shares_resolves_to_zero() {
        let candles = make_candles(&[100.0, 101.0]);
        let record = compute_metrics("TEST", &candles, &FundamentalsSnapshot::default()).unwrap();
        assert_eq!(record.market_cap, 0.0);
        assert_eq!(record.sector, "N/A");
    }

    #[test]
    fn market_cap_derived_from_latest_close() {
        let candles = make_candles(&[100.0, 101.0]);
        let snapshot = FundamentalsSnapshot {
            shares_outstanding: Some(2_000.0),
            dividend_yield: Some(0.012),
            ..Default::default()
        };
        let record = compute_metrics("TEST", &candles, &snapshot).unwrap();
        assert_eq!(record.market_cap, 202_000.0);
        assert_relative_eq!(record.dividend_yield, 1.2, epsilon = 1e-12);
    }

    #[test]
    fn macd_field_is_histogram() {
        let prices: Vec<f64> = (0..80).map(|i| 100.0 + i as f64 * 0.5).collect();
        let candles = make_candles(&prices);
        let record = compute_metrics("TEST", &candles, &FundamentalsSnapshot::default()).unwrap();

        let series = macd::calculate_macd_default(&candles);
        if let Some(IndicatorValue::Macd { line, histogram, .. }) = series.latest() {
            assert_eq!(record.macd, Some(*histogram));
            assert_ne!(record.macd, Some(*line));
        } else {
            panic!("Expected valid Macd value");
        }
    }

    #[test]
    fn non_finite_closes_mark_indicators_insufficient() {
        let mut prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.5).collect();
        prices[55] = f64::NAN;
        let record =
            compute_metrics("TEST", &make_candles(&prices), &FundamentalsSnapshot::default())
                .unwrap();

        assert_eq!(record.sma_50, None);
        assert_eq!(record.ema_50, None);
        assert_eq!(record.rsi, None);
        assert_eq!(record.macd, None);
        assert_eq!(record.volatility, None);
    }

    #[test]
    fn week_52_range_skips_non_finite_prices() {
        let mut candles = make_candles(&[100.0, 110.0, 105.0]);
        candles[1].high = f64::INFINITY;
        candles[2].low = f64::NAN;

        let record = compute_metrics("TEST", &candles, &FundamentalsSnapshot::default()).unwrap();
        assert_eq!(record.week_52_high, 107.0);
        assert_eq!(record.week_52_low, 97.0);
    }
}
