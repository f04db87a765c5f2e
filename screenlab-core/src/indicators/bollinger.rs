//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses population stddev (divide by N). Lookback: period - 1.

use super::rolling::{rolling_mean, rolling_std};
use super::{closes, Indicator};
use crate::domain::Bar;

/// Standard band multiplier used by the screeners.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    fn with_band(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("bollinger_{label}_{period}_{multiplier}"),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Lower)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = closes(bars);
        let mean = rolling_mean(&closes, self.period);
        let sign = match self.band {
            BollingerBand::Middle => return mean,
            BollingerBand::Upper => 1.0,
            BollingerBand::Lower => -1.0,
        };
        let std = rolling_std(&closes, self.period);
        mean.iter()
            .zip(&std)
            .map(|(m, s)| m + sign * self.multiplier * s)
            .collect()
    }
}

/// Band width as a fraction of the middle band: `(upper - lower) / middle`.
pub fn bandwidth(bars: &[Bar], period: usize, multiplier: f64) -> Vec<f64> {
    let upper = Bollinger::upper(period, multiplier).compute(bars);
    let lower = Bollinger::lower(period, multiplier).compute(bars);
    let middle = Bollinger::middle(period, multiplier).compute(bars);
    upper
        .iter()
        .zip(&lower)
        .zip(&middle)
        .map(|((u, l), m)| if *m == 0.0 { f64::NAN } else { (u - l) / m })
        .collect()
}
