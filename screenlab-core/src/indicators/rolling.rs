//! Rolling-window helpers over raw `f64` series.
//!
//! These back the close-only computations (reference extrema, volume ratios,
//! period returns) and the composed oscillators. A window containing NaN
//! produces NaN; the first `window - 1` outputs are always NaN.

/// Apply `f` to every full window of `values`.
fn rolling_apply(values: &[f64], window: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }
    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = f(slice);
    }
    result
}

/// Rolling arithmetic mean.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Rolling sum.
pub fn rolling_sum(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| w.iter().sum())
}

/// Rolling maximum.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Rolling minimum.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Rolling population standard deviation (divide by N).
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| {
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let var = w.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / w.len() as f64;
        var.sqrt()
    })
}

/// Fractional change over `periods` bars: `v[t] / v[t - periods] - 1`.
///
/// Zero or NaN bases produce NaN.
pub fn pct_change(values: &[f64], periods: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if periods == 0 {
        return result;
    }
    for i in periods..n {
        let base = values[i - periods];
        let curr = values[i];
        if base.is_nan() || curr.is_nan() || base == 0.0 {
            continue;
        }
        result[i] = curr / base - 1.0;
    }
    result
}

/// Index of the first non-NaN value, if any.
pub fn first_valid(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| !v.is_nan())
}
