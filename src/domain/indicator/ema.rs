//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first close, then EMA[i] = EMA[i-1] + k*(C[i] - EMA[i-1]).
//! No bias correction is applied to the early values.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::candle::{closes, Candle};
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_ema(bars: &[Candle], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(period),
            values: Vec::new(),
        };
    }

    let closes = closes(bars);
    let ema = ema_values(&closes, period);

    let values = bars
        .iter()
        .zip(ema)
        .enumerate()
        .map(|(i, (bar, v))| IndicatorPoint {
            date: bar.date,
            valid: i + 1 >= period,
            value: IndicatorValue::Simple(v),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}

/// Raw EMA over an arbitrary input, one output per input.
///
/// The incremental form keeps a constant input exactly constant.
pub fn ema_values(input: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = input.first() else {
        return Vec::new();
    };
    let k = 2.0 / (period as f64 + 1.0);

    let mut out = Vec::with_capacity(input.len());
    let mut ema = first;
    out.push(ema);
    for &x in &input[1..] {
        ema += k * (x - ema);
        out.push(ema);
    }
    out
}
