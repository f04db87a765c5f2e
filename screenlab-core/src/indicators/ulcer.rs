//! Ulcer Index: RMS of percentage drawdown from the rolling closing high.
//!
//! dd[t] = 100 * (close[t] - max(close, n)[t]) / max(close, n)[t]
//! UI[t] = sqrt(mean(dd², n))
//! Lookback: 2 * (period - 1).

use super::rolling::{rolling_max, rolling_mean};
use super::{closes, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct UlcerIndex {
    period: usize,
    name: String,
}

impl UlcerIndex {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Ulcer period must be >= 1");
        Self {
            period,
            name: format!("ui_{period}"),
        }
    }
}

impl Indicator for UlcerIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * (self.period - 1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = closes(bars);
        let peak = rolling_max(&closes, self.period);
        let squared: Vec<f64> = closes
            .iter()
            .zip(&peak)
            .map(|(c, p)| {
                let dd = 100.0 * (c - p) / p;
                dd * dd
            })
            .collect();
        rolling_mean(&squared, self.period)
            .into_iter()
            .map(f64::sqrt)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn known_drawdown() {
        // n = 2: dd[1] = -20%, dd[2] = 0 → sqrt((400 + 0) / 2)
        let result = UlcerIndex::new(2).compute(&make_bars(&[10.0, 8.0, 9.0]));
        assert!(result[1].is_nan());
        assert_approx(result[2], 200.0f64.sqrt(), 1e-9);
    }

    #[test]
    fn rising_prices_have_no_ulcer() {
        let closes: Vec<f64> = (0..10).map(|i| 10.0 + i as f64).collect();
        let result = UlcerIndex::new(3).compute(&make_bars(&closes));
        assert_approx(result[9], 0.0, DEFAULT_EPSILON);
    }
}
