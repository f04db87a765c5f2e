//! Chande Momentum Oscillator: 100 * (ΣUp - ΣDown) / (ΣUp + ΣDown) over n changes.

use super::rolling::rolling_sum;
use super::{closes, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct ChandeMomentum {
    period: usize,
    name: String,
}

impl ChandeMomentum {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "CMO period must be >= 1");
        Self {
            period,
            name: format!("chande_momentum_{period}"),
        }
    }
}

impl Indicator for ChandeMomentum {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = closes(bars);
        let mut up = vec![f64::NAN; closes.len()];
        let mut down = vec![f64::NAN; closes.len()];
        for i in 1..closes.len() {
            let ch = closes[i] - closes[i - 1];
            up[i] = if ch.is_nan() { f64::NAN } else { ch.max(0.0) };
            down[i] = if ch.is_nan() { f64::NAN } else { (-ch).max(0.0) };
        }
        let up = rolling_sum(&up, self.period);
        let down = rolling_sum(&down, self.period);
        up.iter()
            .zip(&down)
            .map(|(u, d)| {
                let total = u + d;
                if total == 0.0 {
                    0.0
                } else {
                    100.0 * (u - d) / total
                }
            })
            .collect()
    }
}
