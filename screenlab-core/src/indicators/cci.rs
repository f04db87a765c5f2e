//! Commodity Channel Index (CCI).
//!
//! CCI = (TP - SMA(TP, n)) / (0.015 * mean_deviation(TP, n)), TP = (H+L+C)/3.
//! A window with zero mean deviation reads as 0.
//! Lookback: period - 1.

use super::rolling::rolling_mean;
use super::Indicator;
use crate::domain::Bar;

const LAMBERT: f64 = 0.015;

#[derive(Debug, Clone)]
pub struct Cci {
    period: usize,
    name: String,
}

impl Cci {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "CCI period must be >= 1");
        Self {
            period,
            name: format!("cci_{period}"),
        }
    }
}

impl Indicator for Cci {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let tp: Vec<f64> = bars.iter().map(Bar::typical_price).collect();
        let mean = rolling_mean(&tp, self.period);
        let mut result = vec![f64::NAN; tp.len()];
        for i in (self.period - 1)..tp.len() {
            if mean[i].is_nan() {
                continue;
            }
            let window = &tp[i + 1 - self.period..=i];
            let deviation =
                window.iter().map(|v| (v - mean[i]).abs()).sum::<f64>() / self.period as f64;
            result[i] = if deviation == 0.0 {
                0.0
            } else {
                (tp[i] - mean[i]) / (LAMBERT * deviation)
            };
        }
        result
    }
}
