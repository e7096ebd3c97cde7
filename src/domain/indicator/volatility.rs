//! Annualized volatility of daily close-to-close returns.
//!
//! VOL = sample_stddev(pct_change(C)) * sqrt(252)
//!
//! Computed over the whole series rather than a rolling window. Needs at least
//! two returns (three closes) for a sample standard deviation.

use crate::domain::candle::Candle;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

pub fn daily_returns(bars: &[Candle]) -> Vec<f64> {
    bars.windows(2)
        .filter_map(|pair| pair[1].pct_change(pair[0].close))
        .collect()
}

/// Standard deviation with an (n-1) denominator. `None` for fewer than two samples.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);

    Some(variance.sqrt())
}

pub fn annualized_volatility(bars: &[Candle]) -> Option<f64> {
    let returns = daily_returns(bars);
    sample_stddev(&returns)
        .map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt())
        .filter(|v| v.is_finite())
}
