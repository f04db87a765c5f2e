//! Moving-average family used by the price-vs-MA screens.
//!
//! `MaType` is the closed set of averages a condition may name; each maps to
//! a series function over closes. SMA and EMA reuse their dedicated
//! indicators, RMA is Wilder smoothing, and the rest are composed here.

use super::atr::wilder_smooth;
use super::ema::{ema_after_warmup, ema_of_series};
use super::rolling::rolling_mean;
use super::{closes, Indicator};
use crate::domain::Bar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaType {
    Sma,
    Ema,
    Wma,
    Hma,
    Rma,
    Dema,
    Tema,
    Kama,
    Zlma,
}

impl MaType {
    pub const ALL: [MaType; 9] = [
        MaType::Sma,
        MaType::Ema,
        MaType::Wma,
        MaType::Hma,
        MaType::Rma,
        MaType::Dema,
        MaType::Tema,
        MaType::Kama,
        MaType::Zlma,
    ];

    /// Parse a lowercase identifier (`"sma"`, `"ema"`, ...).
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaType::Sma => "sma",
            MaType::Ema => "ema",
            MaType::Wma => "wma",
            MaType::Hma => "hma",
            MaType::Rma => "rma",
            MaType::Dema => "dema",
            MaType::Tema => "tema",
            MaType::Kama => "kama",
            MaType::Zlma => "zlma",
        }
    }

    /// Compute this average over an arbitrary series.
    pub fn apply(&self, values: &[f64], period: usize) -> Vec<f64> {
        match self {
            MaType::Sma => rolling_mean(values, period),
            MaType::Ema => ema_of_series(values, period),
            MaType::Wma => wma_of_series(values, period),
            MaType::Hma => hma_of_series(values, period),
            MaType::Rma => wilder_smooth(values, period),
            MaType::Dema => dema_of_series(values, period),
            MaType::Tema => tema_of_series(values, period),
            MaType::Kama => kama_of_series(values, period),
            MaType::Zlma => zlma_of_series(values, period),
        }
    }
}

/// A moving average of closes, named `"{type}_{period}"`.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    ma_type: MaType,
    period: usize,
    name: String,
}

impl MovingAverage {
    pub fn new(ma_type: MaType, period: usize) -> Self {
        assert!(period >= 1, "moving average period must be >= 1");
        Self {
            ma_type,
            period,
            name: format!("{}_{period}", ma_type.as_str()),
        }
    }
}

impl Indicator for MovingAverage {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.ma_type {
            MaType::Dema => 2 * (self.period - 1),
            MaType::Tema => 3 * (self.period - 1),
            MaType::Hma => self.period - 1 + hma_smoothing(self.period) - 1,
            MaType::Zlma => (self.period - 1) / 2 + self.period - 1,
            _ => self.period - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        self.ma_type.apply(&closes(bars), self.period)
    }
}

/// Linearly weighted average, newest value weighted `period`.
pub fn wma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    let denom = (period * (period + 1)) as f64 / 2.0;
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let weighted: f64 = window
            .iter()
            .enumerate()
            .map(|(k, v)| (k + 1) as f64 * v)
            .sum();
        result[i] = weighted / denom;
    }
    result
}

fn hma_smoothing(period: usize) -> usize {
    ((period as f64).sqrt().floor() as usize).max(1)
}

/// Hull MA: WMA(2 * WMA(n/2) - WMA(n), sqrt(n)).
pub fn hma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let half = wma_of_series(values, (period / 2).max(1));
    let full = wma_of_series(values, period);
    let raw: Vec<f64> = half.iter().zip(&full).map(|(h, f)| 2.0 * h - f).collect();
    wma_of_series(&raw, hma_smoothing(period))
}

/// Double EMA: 2 * EMA - EMA(EMA).
pub fn dema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let e1 = ema_of_series(values, period);
    let e2 = ema_after_warmup(&e1, period);
    e1.iter().zip(&e2).map(|(a, b)| 2.0 * a - b).collect()
}

/// Triple EMA: 3 * EMA - 3 * EMA(EMA) + EMA(EMA(EMA)).
pub fn tema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let e1 = ema_of_series(values, period);
    let e2 = ema_after_warmup(&e1, period);
    let e3 = ema_after_warmup(&e2, period);
    (0..values.len())
        .map(|i| 3.0 * e1[i] - 3.0 * e2[i] + e3[i])
        .collect()
}

/// Kaufman adaptive MA with the conventional 2/30 fast/slow constants.
///
/// Seeded with the close at `period - 1`.
pub fn kama_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    let fast = 2.0 / (2.0 + 1.0);
    let slow = 2.0 / (30.0 + 1.0);

    let mut prev = values[period - 1];
    if prev.is_nan() {
        return result;
    }
    result[period - 1] = prev;

    for i in period..n {
        let change = (values[i] - values[i - period]).abs();
        let volatility: f64 = (i + 1 - period..=i)
            .map(|k| (values[k] - values[k - 1]).abs())
            .sum();
        if change.is_nan() || volatility.is_nan() {
            return result;
        }
        let er = if volatility == 0.0 { 0.0 } else { change / volatility };
        let sc = (er * (fast - slow) + slow).powi(2);
        prev += sc * (values[i] - prev);
        result[i] = prev;
    }
    result
}

/// Zero-lag EMA: EMA of `2 * v[t] - v[t - lag]`, lag = (period - 1) / 2.
pub fn zlma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let lag = period.saturating_sub(1) / 2;
    let adjusted: Vec<f64> = (0..values.len())
        .map(|i| {
            if i < lag {
                f64::NAN
            } else {
                2.0 * values[i] - values[i - lag]
            }
        })
        .collect();
    ema_after_warmup(&adjusted, period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ma_type_ids_round_trip() {
        for t in MaType::ALL {
            assert_eq!(MaType::from_id(t.as_str()), Some(t));
        }
        assert_eq!(MaType::from_id("fwma"), None);
    }

    #[test]
    fn wma_known_value() {
        // (1*1 + 2*2 + 3*3) / 6 = 14/6
        let r = wma_of_series(&[1.0, 2.0, 3.0], 3);
        assert_approx(r[2], 14.0 / 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn every_average_of_a_constant_is_the_constant() {
        let values = vec![50.0; 40];
        for t in MaType::ALL {
            let r = t.apply(&values, 5);
            assert_approx(*r.last().unwrap(), 50.0, 1e-9);
        }
    }

    #[test]
    fn linear_series_zero_lag_averages_track_price() {
        // On a straight line DEMA, TEMA, HMA and ZLMA carry no lag
        let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let last = *values.last().unwrap();
        for (t, period) in [
            (MaType::Dema, 6),
            (MaType::Tema, 6),
            (MaType::Hma, 6),
            (MaType::Zlma, 5),
        ] {
            let r = t.apply(&values, period);
            assert_approx(*r.last().unwrap(), last, 1e-6);
        }
    }

    #[test]
    fn sma_lags_a_linear_series() {
        let values: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let r = MaType::Sma.apply(&values, 5);
        assert_approx(r[9], 7.0, DEFAULT_EPSILON);
    }

    #[test]
    fn kama_full_efficiency_uses_fast_constant() {
        let values = [10.0, 10.0, 10.0, 13.0];
        let r = kama_of_series(&values, 3);
        // change 3, volatility 3 → er 1 → sc = fast^2 = 4/9
        assert_approx(r[3], 10.0 + 4.0 / 9.0 * 3.0, 1e-12);
    }

    #[test]
    fn moving_average_name() {
        let ma = MovingAverage::new(MaType::Ema, 20);
        assert_eq!(ma.name(), "ema_20");
        let bars = make_bars(&[1.0; 25]);
        assert_approx(*ma.compute(&bars).last().unwrap(), 1.0, DEFAULT_EPSILON);
    }
}
