//! Exponential smoothing over arbitrary series.
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1]
//! Seed: EMA[period-1] = mean of the first `period` values.
//!
//! The close-price EMA is `MaType::Ema`; these helpers back it and every
//! oscillator that smooths an intermediate series.

use super::rolling::first_valid;

/// EMA of an arbitrary series, SMA-seeded at index `period - 1`.
///
/// A NaN inside the seed window yields an all-NaN result; a NaN after the
/// seed taints every later value.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    let seed_window = &values[..period];
    if seed_window.iter().any(|v| v.is_nan()) {
        return result;
    }
    let mut prev = seed_window.iter().sum::<f64>() / period as f64;
    result[period - 1] = prev;

    let alpha = 2.0 / (period as f64 + 1.0);
    for i in period..n {
        if values[i].is_nan() {
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }

    result
}

/// EMA of a series that starts with a NaN warmup region.
///
/// Skips the leading NaNs, then seeds as [`ema_of_series`] does. Used when
/// chaining EMAs (DEMA, TEMA, TSI, PPO-based oscillators).
pub fn ema_after_warmup(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if let Some(start) = first_valid(values) {
        let tail = ema_of_series(&values[start..], period);
        result[start..].copy_from_slice(&tail);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn period_1_is_identity() {
        let result = ema_of_series(&[100.0, 200.0, 300.0], 1);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn period_3_known_values() {
        // alpha = 0.5, seed at index 2 = mean(10,11,12) = 11
        let result = ema_of_series(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_in_seed_produces_all_nan() {
        let values = [10.0, f64::NAN, 12.0, 13.0, 14.0];
        assert!(ema_of_series(&values, 3).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn nan_after_seed_propagates() {
        let values = [10.0, 11.0, 12.0, f64::NAN, 14.0];
        let result = ema_of_series(&values, 3);
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
    }

    #[test]
    fn short_series_is_all_nan() {
        assert!(ema_of_series(&[1.0, 2.0], 3).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn after_warmup_skips_leading_nan() {
        let values = [f64::NAN, f64::NAN, 10.0, 11.0, 12.0, 13.0];
        let result = ema_after_warmup(&values, 3);
        assert!(result[3].is_nan());
        assert_approx(result[4], 11.0, DEFAULT_EPSILON);
        assert_approx(result[5], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn after_warmup_all_nan() {
        let values = [f64::NAN; 4];
        assert!(ema_after_warmup(&values, 2).iter().all(|v| v.is_nan()));
    }
}
