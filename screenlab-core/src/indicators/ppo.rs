//! Percentage Price Oscillator: 100 * (EMA(12) - EMA(26)) / EMA(26).
//!
//! Reported in percentage points, like MACD scaled by the slow average.

use super::ema::ema_of_series;
use super::{closes, Indicator};
use crate::domain::Bar;

pub const FAST: usize = 12;
pub const SLOW: usize = 26;

#[derive(Debug, Clone)]
pub struct PercentagePriceOscillator {
    fast: usize,
    slow: usize,
    name: String,
}

impl PercentagePriceOscillator {
    pub fn new(fast: usize, slow: usize) -> Self {
        assert!(fast >= 1 && slow >= fast, "PPO needs 1 <= fast <= slow");
        Self {
            fast,
            slow,
            name: format!("percentage_price_osc_{fast}_{slow}"),
        }
    }
}

impl Default for PercentagePriceOscillator {
    fn default() -> Self {
        Self::new(FAST, SLOW)
    }
}

impl Indicator for PercentagePriceOscillator {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.slow - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = closes(bars);
        let fast = ema_of_series(&closes, self.fast);
        let slow = ema_of_series(&closes, self.slow);
        fast.iter()
            .zip(&slow)
            .map(|(f, s)| if *s == 0.0 { f64::NAN } else { 100.0 * (f - s) / s })
            .collect()
    }
}
