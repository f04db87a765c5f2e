//! Money Flow Index: volume-weighted RSI on typical price.
//!
//! Raw money flow = TP * volume, signed by the direction of TP versus the
//! previous bar. MFI = 100 * positive / (positive + negative); a window with
//! no flow either way reads as 50.

use super::rolling::rolling_sum;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct MoneyFlowIndex {
    period: usize,
    name: String,
}

impl MoneyFlowIndex {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "MFI period must be >= 1");
        Self {
            period,
            name: format!("money_flow_idx_{period}"),
        }
    }
}

impl Indicator for MoneyFlowIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut positive = vec![f64::NAN; n];
        let mut negative = vec![f64::NAN; n];
        for i in 1..n {
            let tp = bars[i].typical_price();
            let prev = bars[i - 1].typical_price();
            let flow = tp * bars[i].volume;
            positive[i] = if tp > prev { flow } else { 0.0 };
            negative[i] = if tp < prev { flow } else { 0.0 };
            if flow.is_nan() || prev.is_nan() {
                positive[i] = f64::NAN;
                negative[i] = f64::NAN;
            }
        }
        let pos = rolling_sum(&positive, self.period);
        let neg = rolling_sum(&negative, self.period);
        pos.iter()
            .zip(&neg)
            .map(|(p, q)| {
                let total = p + q;
                if total == 0.0 {
                    50.0
                } else {
                    100.0 * p / total
                }
            })
            .collect()
    }
}
