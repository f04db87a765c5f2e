//! Schaff Trend Cycle.
//!
//! MACD(23, 50) passed twice through a stochastic over `cycle` bars, each
//! stage smoothed with factor 0.5. A flat window repeats the previous
//! stochastic reading (50 before any reading exists).

use super::ema::ema_of_series;
use super::rolling::{rolling_max, rolling_min};
use super::{closes, Indicator};
use crate::domain::Bar;

pub const FAST: usize = 23;
pub const SLOW: usize = 50;
pub const CYCLE: usize = 10;
const FACTOR: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct SchaffTrendCycle {
    fast: usize,
    slow: usize,
    cycle: usize,
    name: String,
}

impl SchaffTrendCycle {
    pub fn new(fast: usize, slow: usize, cycle: usize) -> Self {
        assert!(fast >= 1 && slow >= fast && cycle >= 1, "invalid STC parameters");
        Self {
            fast,
            slow,
            cycle,
            name: format!("schaff_trend_cycle_{fast}_{slow}_{cycle}"),
        }
    }
}

impl Default for SchaffTrendCycle {
    fn default() -> Self {
        Self::new(FAST, SLOW, CYCLE)
    }
}

/// Stochastic of `values` over `cycle`, then exponentially smoothed.
fn smoothed_stochastic(values: &[f64], cycle: usize) -> Vec<f64> {
    let highest = rolling_max(values, cycle);
    let lowest = rolling_min(values, cycle);
    let mut result = vec![f64::NAN; values.len()];
    let mut last_k = 50.0;
    let mut smoothed: Option<f64> = None;
    for i in 0..values.len() {
        let range = highest[i] - lowest[i];
        if range.is_nan() {
            if smoothed.is_some() {
                return result;
            }
            continue;
        }
        if range > 0.0 {
            last_k = 100.0 * (values[i] - lowest[i]) / range;
        }
        let next = match smoothed {
            Some(prev) => prev + FACTOR * (last_k - prev),
            None => last_k,
        };
        smoothed = Some(next);
        result[i] = next;
    }
    result
}

impl Indicator for SchaffTrendCycle {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.slow - 1 + 2 * (self.cycle - 1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = closes(bars);
        let fast = ema_of_series(&closes, self.fast);
        let slow = ema_of_series(&closes, self.slow);
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let first = smoothed_stochastic(&macd, self.cycle);
        smoothed_stochastic(&first, self.cycle)
    }
}
