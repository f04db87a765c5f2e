//! Range-position oscillators: Stochastic, Stochastic RSI, Williams %R, KDJ.
//!
//! All four locate a value inside its rolling high/low range:
//! raw = 100 * (value - lowest) / (highest - lowest).
//! A flat range (highest == lowest) reads as the midpoint.

use super::rolling::{rolling_max, rolling_mean, rolling_min};
use super::rsi::rsi_of_series;
use super::{closes, Indicator};
use crate::domain::Bar;

/// %K smoothing length shared by Stochastic and Stochastic RSI.
pub const K_SMOOTHING: usize = 3;

fn highs(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.high).collect()
}

fn lows(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.low).collect()
}

/// Position of `value[i]` within `[lowest[i], highest[i]]` on a 0..100 scale.
pub(crate) fn range_position(value: &[f64], highest: &[f64], lowest: &[f64]) -> Vec<f64> {
    value
        .iter()
        .zip(highest.iter().zip(lowest))
        .map(|(v, (h, l))| {
            let range = h - l;
            if range.is_nan() || v.is_nan() {
                f64::NAN
            } else if range == 0.0 {
                50.0
            } else {
                100.0 * (v - l) / range
            }
        })
        .collect()
}

/// Raw stochastic of closes against the high/low range.
fn raw_stochastic(bars: &[Bar], period: usize) -> Vec<f64> {
    range_position(
        &closes(bars),
        &rolling_max(&highs(bars), period),
        &rolling_min(&lows(bars), period),
    )
}

/// Slow %K: SMA(3) of the raw stochastic.
#[derive(Debug, Clone)]
pub struct Stochastic {
    period: usize,
    name: String,
}

impl Stochastic {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Stochastic period must be >= 1");
        Self {
            period,
            name: format!("stoch_{period}"),
        }
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1 + K_SMOOTHING - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        rolling_mean(&raw_stochastic(bars, self.period), K_SMOOTHING)
    }
}

/// Stochastic applied to RSI(period) over the same period, %K smoothed by 3.
#[derive(Debug, Clone)]
pub struct StochRsi {
    period: usize,
    name: String,
}

impl StochRsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "StochRSI period must be >= 1");
        Self {
            period,
            name: format!("stochrsi_{period}"),
        }
    }
}

impl Indicator for StochRsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1 + K_SMOOTHING - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let rsi = rsi_of_series(&closes(bars), self.period);
        let raw = range_position(
            &rsi,
            &rolling_max(&rsi, self.period),
            &rolling_min(&rsi, self.period),
        );
        rolling_mean(&raw, K_SMOOTHING)
    }
}

/// Williams %R on a -100..0 scale.
#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
    name: String,
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Williams %R period must be >= 1");
        Self {
            period,
            name: format!("williams_r_{period}"),
        }
    }
}

impl Indicator for WilliamsR {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        raw_stochastic(bars, self.period)
            .into_iter()
            .map(|k| k - 100.0)
            .collect()
    }
}

/// KDJ K line: K[t] = 2/3 * K[t-1] + 1/3 * RSV[t], K seeded at 50.
#[derive(Debug, Clone)]
pub struct Kdj {
    period: usize,
    name: String,
}

impl Kdj {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "KDJ period must be >= 1");
        Self {
            period,
            name: format!("kdj_{period}"),
        }
    }
}

impl Indicator for Kdj {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let rsv = raw_stochastic(bars, self.period);
        let mut result = vec![f64::NAN; rsv.len()];
        let mut k = 50.0;
        let mut started = false;
        for (i, &r) in rsv.iter().enumerate() {
            if r.is_nan() {
                if started {
                    return result;
                }
                continue;
            }
            started = true;
            k = 2.0 / 3.0 * k + r / 3.0;
            result[i] = k;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, make_ohlc_bars, DEFAULT_EPSILON};

    /// Rising bars that each close on their high.
    fn closing_on_highs(n: usize) -> Vec<Bar> {
        let data: Vec<_> = (0..n)
            .map(|i| {
                let base = 100.0 + i as f64;
                (base, base + 2.0, base - 1.0, base + 2.0)
            })
            .collect();
        make_ohlc_bars(&data)
    }

    #[test]
    fn stochastic_closing_on_highs_is_100() {
        let result = Stochastic::new(5).compute(&closing_on_highs(10));
        assert!(result[5].is_nan());
        assert_approx(result[6], 100.0, DEFAULT_EPSILON);
        assert_approx(result[9], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn stochastic_known_raw_value() {
        // Range over 3 bars: high 14, low 9, close 12.5 → raw 70; three identical windows
        let bars = make_ohlc_bars(&[
            (10.0, 14.0, 9.0, 12.5),
            (10.0, 14.0, 9.0, 12.5),
            (10.0, 14.0, 9.0, 12.5),
            (10.0, 14.0, 9.0, 12.5),
            (10.0, 14.0, 9.0, 12.5),
        ]);
        let result = Stochastic::new(3).compute(&bars);
        assert_approx(result[4], 70.0, 1e-9);
    }

    #[test]
    fn williams_r_closing_on_high_is_zero() {
        let result = WilliamsR::new(5).compute(&closing_on_highs(6));
        assert_approx(result[5], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn williams_r_flat_range_is_midpoint() {
        let bars = make_ohlc_bars(&[(10.0, 10.0, 10.0, 10.0); 4]);
        assert_approx(WilliamsR::new(3).compute(&bars)[3], -50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn kdj_recursion_from_fifty() {
        let result = Kdj::new(3).compute(&closing_on_highs(5));
        assert!(result[1].is_nan());
        let k1 = 2.0 / 3.0 * 50.0 + 100.0 / 3.0;
        assert_approx(result[2], k1, 1e-12);
        assert_approx(result[3], 2.0 / 3.0 * k1 + 100.0 / 3.0, 1e-12);
    }

    #[test]
    fn stochrsi_flat_rsi_is_midpoint() {
        // Monotonic rise pins RSI at 100, so its range collapses
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let result = StochRsi::new(5).compute(&make_bars(&closes));
        assert_approx(*result.last().unwrap(), 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn stochrsi_bounds() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + 10.0 * ((i as f64) * 0.7).sin())
            .collect();
        for v in StochRsi::new(14).compute(&make_bars(&closes)) {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v));
            }
        }
    }

    #[test]
    fn lookbacks() {
        assert_eq!(Stochastic::new(14).lookback(), 15);
        assert_eq!(StochRsi::new(14).lookback(), 29);
        assert_eq!(WilliamsR::new(14).lookback(), 13);
    }
}
