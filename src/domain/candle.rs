//! Daily candle representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub open_interest: i64,
}

impl Candle {
    /// Percentage change of this close relative to `prev_close`.
    ///
    /// `None` when the previous close is zero.
    pub fn pct_change(&self, prev_close: f64) -> Option<f64> {
        if prev_close == 0.0 {
            None
        } else {
            Some((self.close - prev_close) / prev_close)
        }
    }

    /// First price field holding NaN or an infinity, with its value.
    pub fn non_finite_price(&self) -> Option<(&'static str, f64)> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
    }
}

pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_candle() -> Candle {
        Candle {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000,
            open_interest: 0,
        }
    }

    #[test]
    fn pct_change_up() {
        let candle = sample_candle();
        // (105 - 100) / 100 = 0.05
        let change = candle.pct_change(100.0).unwrap();
        assert!((change - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn pct_change_down() {
        let candle = sample_candle();
        // (105 - 150) / 150 = -0.3
        let change = candle.pct_change(150.0).unwrap();
        assert!((change + 0.3).abs() < 1e-12);
    }

    #[test]
    fn pct_change_zero_previous_close() {
        assert_eq!(sample_candle().pct_change(0.0), None);
    }

    #[test]
    fn finite_prices_pass() {
        assert_eq!(sample_candle().non_finite_price(), None);
    }

    #[test]
    fn non_finite_price_names_first_bad_field() {
        let mut candle = sample_candle();
        candle.low = f64::NEG_INFINITY;
        candle.close = f64::NAN;
        let (name, value) = candle.non_finite_price().unwrap();
        assert_eq!(name, "low");
        assert_eq!(value, f64::NEG_INFINITY);
    }

    #[test]
    fn closes_preserves_order() {
        let mut second = sample_candle();
        second.close = 99.5;
        let candles = vec![sample_candle(), second];
        assert_eq!(closes(&candles), vec![105.0, 99.5]);
    }
}
