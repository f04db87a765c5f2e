//! True Strength Index: double-smoothed momentum over double-smoothed |momentum|.
//!
//! TSI = 100 * EMA(EMA(Δclose, 25), 13) / EMA(EMA(|Δclose|, 25), 13)

use super::ema::ema_after_warmup;
use super::{closes, Indicator};
use crate::domain::Bar;

pub const LONG: usize = 25;
pub const SHORT: usize = 13;

#[derive(Debug, Clone)]
pub struct TrueStrengthIndex {
    long: usize,
    short: usize,
    name: String,
}

impl TrueStrengthIndex {
    pub fn new(long: usize, short: usize) -> Self {
        assert!(long >= 1 && short >= 1, "TSI periods must be >= 1");
        Self {
            long,
            short,
            name: format!("tsi_{long}_{short}"),
        }
    }
}

impl Default for TrueStrengthIndex {
    fn default() -> Self {
        Self::new(LONG, SHORT)
    }
}

impl Indicator for TrueStrengthIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.long + self.short - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = closes(bars);
        let mut momentum = vec![f64::NAN; closes.len()];
        for i in 1..closes.len() {
            momentum[i] = closes[i] - closes[i - 1];
        }
        let magnitude: Vec<f64> = momentum.iter().map(|m| m.abs()).collect();

        let smooth = |series: &[f64]| {
            ema_after_warmup(&ema_after_warmup(series, self.long), self.short)
        };
        let num = smooth(&momentum);
        let den = smooth(&magnitude);
        num.iter()
            .zip(&den)
            .map(|(n, d)| if *d == 0.0 { 0.0 } else { 100.0 * n / d })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn steady_rise_is_100() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let result = TrueStrengthIndex::default().compute(&make_bars(&closes));
        assert!(result[36].is_nan());
        assert_approx(result[37], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn steady_fall_is_minus_100() {
        let closes: Vec<f64> = (0..50).map(|i| 200.0 - i as f64).collect();
        let result = TrueStrengthIndex::default().compute(&make_bars(&closes));
        assert_approx(*result.last().unwrap(), -100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_is_zero() {
        let result = TrueStrengthIndex::default().compute(&make_bars(&[10.0; 50]));
        assert_eq!(*result.last().unwrap(), 0.0);
    }
}
