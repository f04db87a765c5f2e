//! Keltner Channel: EMA +/- ATR multiplier.
//!
//! - Middle: EMA(close, ema_period)
//! - Upper: middle + mult * ATR(atr_period)
//! - Lower: middle - mult * ATR(atr_period)
//!
//! Lookback: max(ema_period - 1, atr_period).

use super::atr::{true_range, wilder_smooth};
use super::ema::ema_of_series;
use super::{closes, Indicator};
use crate::domain::Bar;

/// Which band of the Keltner Channel to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeltnerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Keltner {
    ema_period: usize,
    atr_period: usize,
    multiplier: f64,
    band: KeltnerBand,
    name: String,
}

impl Keltner {
    fn with_band(ema_period: usize, atr_period: usize, multiplier: f64, band: KeltnerBand) -> Self {
        assert!(ema_period >= 1 && atr_period >= 1, "Keltner periods must be >= 1");
        let label = match band {
            KeltnerBand::Upper => "upper",
            KeltnerBand::Middle => "middle",
            KeltnerBand::Lower => "lower",
        };
        Self {
            ema_period,
            atr_period,
            multiplier,
            band,
            name: format!("keltner_{label}_{ema_period}_{atr_period}_{multiplier}"),
        }
    }

    pub fn upper(ema_period: usize, atr_period: usize, multiplier: f64) -> Self {
        Self::with_band(ema_period, atr_period, multiplier, KeltnerBand::Upper)
    }

    pub fn middle(ema_period: usize, atr_period: usize, multiplier: f64) -> Self {
        Self::with_band(ema_period, atr_period, multiplier, KeltnerBand::Middle)
    }

    pub fn lower(ema_period: usize, atr_period: usize, multiplier: f64) -> Self {
        Self::with_band(ema_period, atr_period, multiplier, KeltnerBand::Lower)
    }
}

impl Indicator for Keltner {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        (self.ema_period.saturating_sub(1)).max(self.atr_period)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let middle = ema_of_series(&closes(bars), self.ema_period);
        let sign = match self.band {
            KeltnerBand::Middle => return middle,
            KeltnerBand::Upper => 1.0,
            KeltnerBand::Lower => -1.0,
        };
        let atr = wilder_smooth(&true_range(bars), self.atr_period);
        middle
            .iter()
            .zip(&atr)
            .map(|(m, a)| m + sign * self.multiplier * a)
            .collect()
    }
}

/// Absolute channel width, `upper - lower` (equals `2 * mult * ATR`).
pub fn channel_width(bars: &[Bar], ema_period: usize, atr_period: usize, multiplier: f64) -> Vec<f64> {
    let upper = Keltner::upper(ema_period, atr_period, multiplier).compute(bars);
    let lower = Keltner::lower(ema_period, atr_period, multiplier).compute(bars);
    upper.iter().zip(&lower).map(|(u, l)| u - l).collect()
}
