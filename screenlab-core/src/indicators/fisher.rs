//! Fisher Transform (Ehlers) of the bar midpoint.
//!
//! pos = (mid - lowest) / (highest - lowest) over `period` bars
//! v[t] = 0.66 * (pos - 0.5) + 0.67 * v[t-1], clamped to ±0.999
//! fisher[t] = 0.5 * ln((1 + v) / (1 - v)) + 0.5 * fisher[t-1]
//!
//! Both recursions start from zero at the first full window.

use super::rolling::{rolling_max, rolling_min};
use super::Indicator;
use crate::domain::Bar;

const CLAMP: f64 = 0.999;

#[derive(Debug, Clone)]
pub struct FisherTransform {
    period: usize,
    name: String,
}

impl FisherTransform {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Fisher period must be >= 1");
        Self {
            period,
            name: format!("fisher_transform_{period}"),
        }
    }
}

impl Indicator for FisherTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mid: Vec<f64> = bars.iter().map(Bar::median_price).collect();
        let highest = rolling_max(&mid, self.period);
        let lowest = rolling_min(&mid, self.period);

        let mut result = vec![f64::NAN; mid.len()];
        let mut value = 0.0;
        let mut fisher = 0.0;
        let mut started = false;
        for i in 0..mid.len() {
            let range = highest[i] - lowest[i];
            if range.is_nan() {
                if started {
                    return result;
                }
                continue;
            }
            started = true;
            let pos = if range == 0.0 {
                0.5
            } else {
                (mid[i] - lowest[i]) / range
            };
            value = (0.66 * (pos - 0.5) + 0.67 * value).clamp(-CLAMP, CLAMP);
            fisher = 0.5 * ((1.0 + value) / (1.0 - value)).ln() + 0.5 * fisher;
            result[i] = fisher;
        }
        result
    }
}
