//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR uses Wilder smoothing (alpha = 1/period), seeded from TR[1] onward.
//! Lookback: period.

use super::rolling::first_valid;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut tr = true_range(bars);
        // TR[0] has no previous close, so it is excluded from the seed.
        if let Some(first) = tr.first_mut() {
            *first = f64::NAN;
        }
        wilder_smooth(&tr, self.period)
    }
}

/// True Range series. TR[0] = high[0] - low[0].
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let hl = bar.high - bar.low;
        let value = match i {
            0 => hl,
            _ => {
                let pc = bars[i - 1].close;
                hl.max((bar.high - pc).abs()).max((bar.low - pc).abs())
            }
        };
        // f64::max swallows NaN, so re-check the inputs explicitly
        let poisoned = bar.high.is_nan()
            || bar.low.is_nan()
            || (i > 0 && bars[i - 1].close.is_nan());
        tr.push(if poisoned { f64::NAN } else { value });
    }
    tr
}

/// Wilder smoothing (RMA). Alpha = 1/period.
///
/// Seed: mean of the first `period` values after any leading NaN run. A NaN
/// inside the seed window or after it ends the valid output.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let Some(start) = first_valid(values) else {
        return result;
    };
    if period == 0 || n - start < period {
        return result;
    }

    let seed_end = start + period;
    let seed_window = &values[start..seed_end];
    if seed_window.iter().any(|v| v.is_nan()) {
        return result;
    }
    let mut prev = seed_window.iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = prev;

    let alpha = 1.0 / period as f64;
    for i in seed_end..n {
        if values[i].is_nan() {
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }

    result
}
