//! Ultimate Oscillator (Williams), 7/14/28.
//!
//! BP = close - min(low, prev_close); TR = max(high, prev_close) - min(low, prev_close)
//! UO = 100 * (4 * A7 + 2 * A14 + A28) / 7, A_n = sum(BP, n) / sum(TR, n).

use super::rolling::rolling_sum;
use super::Indicator;
use crate::domain::Bar;

pub const LEGS: [usize; 3] = [7, 14, 28];

#[derive(Debug, Clone)]
pub struct UltimateOscillator {
    legs: [usize; 3],
    name: String,
}

impl UltimateOscillator {
    pub fn new(fast: usize, medium: usize, slow: usize) -> Self {
        assert!(fast >= 1 && fast <= medium && medium <= slow, "UO legs must be ordered");
        Self {
            legs: [fast, medium, slow],
            name: format!("ultimate_osc_{fast}_{medium}_{slow}"),
        }
    }
}

impl Default for UltimateOscillator {
    fn default() -> Self {
        Self::new(LEGS[0], LEGS[1], LEGS[2])
    }
}

impl Indicator for UltimateOscillator {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.legs[2]
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut bp = vec![f64::NAN; n];
        let mut tr = vec![f64::NAN; n];
        for i in 1..n {
            let pc = bars[i - 1].close;
            let floor = bars[i].low.min(pc);
            bp[i] = bars[i].close - floor;
            tr[i] = bars[i].high.max(pc) - floor;
        }

        let averages: Vec<Vec<f64>> = self
            .legs
            .iter()
            .map(|&len| {
                let b = rolling_sum(&bp, len);
                let t = rolling_sum(&tr, len);
                b.iter()
                    .zip(&t)
                    .map(|(b, t)| if *t == 0.0 { f64::NAN } else { b / t })
                    .collect()
            })
            .collect();

        (0..n)
            .map(|i| 100.0 * (4.0 * averages[0][i] + 2.0 * averages[1][i] + averages[2][i]) / 7.0)
            .collect()
    }
}
