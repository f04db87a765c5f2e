//! ADX: Average Directional Index (Wilder).
//!
//! 1. +DM / -DM from consecutive bars
//! 2. Wilder-smooth +DM, -DM and TR
//! 3. DI± = 100 * smoothed(DM±) / smoothed(TR)
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! Lookback: 2 * period.

use super::atr::{true_range, wilder_smooth};
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

/// Directional movement pair for bar `i` (requires `i >= 1`).
fn directional_movement(prev: &Bar, curr: &Bar) -> (f64, f64) {
    if prev.high.is_nan() || prev.low.is_nan() || curr.high.is_nan() || curr.low.is_nan() {
        return (f64::NAN, f64::NAN);
    }
    let up = curr.high - prev.high;
    let down = prev.low - curr.low;
    let plus = if up > down && up > 0.0 { up } else { 0.0 };
    let minus = if down > up && down > 0.0 { down } else { 0.0 };
    (plus, minus)
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        if n < 2 {
            return vec![f64::NAN; n];
        }

        let mut plus_dm = vec![f64::NAN; n];
        let mut minus_dm = vec![f64::NAN; n];
        for i in 1..n {
            (plus_dm[i], minus_dm[i]) = directional_movement(&bars[i - 1], &bars[i]);
        }

        let mut tr = true_range(bars);
        tr[0] = f64::NAN;
        let smooth_tr = wilder_smooth(&tr, self.period);
        let smooth_plus = wilder_smooth(&plus_dm, self.period);
        let smooth_minus = wilder_smooth(&minus_dm, self.period);

        let dx: Vec<f64> = (0..n)
            .map(|i| {
                let (t, p, m) = (smooth_tr[i], smooth_plus[i], smooth_minus[i]);
                if t.is_nan() || p.is_nan() || m.is_nan() || t == 0.0 {
                    return f64::NAN;
                }
                let plus_di = 100.0 * p / t;
                let minus_di = 100.0 * m / t;
                let sum = plus_di + minus_di;
                if sum == 0.0 {
                    0.0
                } else {
                    100.0 * (plus_di - minus_di).abs() / sum
                }
            })
            .collect();

        wilder_smooth(&dx, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    #[test]
    fn adx_bounds() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 110.0),
            (110.0, 111.0, 104.0, 105.0),
            (105.0, 109.0, 103.0, 107.0),
            (107.0, 113.0, 105.0, 112.0),
        ]);
        for (i, &v) in Adx::new(3).compute(&bars).iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "ADX out of bounds at bar {i}: {v}");
            }
        }
    }

    #[test]
    fn adx_pure_uptrend_is_100() {
        // Every bar makes a higher high and a higher low: -DM is always zero
        let data: Vec<_> = (0..20)
            .map(|i| {
                let base = 100.0 + i as f64 * 5.0;
                (base - 1.0, base + 3.0, base - 3.0, base + 2.0)
            })
            .collect();
        let result = Adx::new(5).compute(&make_ohlc_bars(&data));
        let last = *result.last().unwrap();
        assert!((last - 100.0).abs() < 1e-9, "got {last}");
    }

    #[test]
    fn adx_lookback() {
        assert_eq!(Adx::new(14).lookback(), 28);
    }

    #[test]
    fn adx_too_few_bars() {
        let bars = make_ohlc_bars(&[(100.0, 105.0, 95.0, 102.0)]);
        assert!(Adx::new(3).compute(&bars).iter().all(|v| v.is_nan()));
    }
}
