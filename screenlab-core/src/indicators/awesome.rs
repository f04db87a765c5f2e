//! Awesome Oscillator: SMA(5) - SMA(34) of the bar midpoint (H+L)/2.

use super::rolling::rolling_mean;
use super::Indicator;
use crate::domain::Bar;

pub const FAST: usize = 5;
pub const SLOW: usize = 34;

#[derive(Debug, Clone)]
pub struct AwesomeOscillator {
    fast: usize,
    slow: usize,
    name: String,
}

impl AwesomeOscillator {
    pub fn new(fast: usize, slow: usize) -> Self {
        assert!(fast >= 1 && slow >= fast, "Awesome Oscillator needs 1 <= fast <= slow");
        Self {
            fast,
            slow,
            name: format!("awesome_osc_{fast}_{slow}"),
        }
    }
}

impl Default for AwesomeOscillator {
    fn default() -> Self {
        Self::new(FAST, SLOW)
    }
}

impl Indicator for AwesomeOscillator {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.slow - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mid: Vec<f64> = bars.iter().map(Bar::median_price).collect();
        let fast = rolling_mean(&mid, self.fast);
        let slow = rolling_mean(&mid, self.slow);
        fast.iter().zip(&slow).map(|(f, s)| f - s).collect()
    }
}
