//! Indicator library.
//!
//! Indicators are pure functions: bar history in, numeric series out. Every
//! implementation returns a series of the same length as its input with
//! `f64::NAN` in the warmup region, so the evaluator can read "latest" as the
//! last element and treat a NaN there as insufficient history.
//!
//! Multi-band indicators (Bollinger, Keltner, Donchian) are exposed as
//! separate named instances per band, keeping the single-series `Indicator`
//! trait unchanged.

pub mod adx;
pub mod atr;
pub mod awesome;
pub mod bollinger;
pub mod cci;
pub mod cmo;
pub mod donchian;
pub mod ema;
pub mod fisher;
pub mod keltner;
pub mod mfi;
pub mod moving_average;
pub mod patterns;
pub mod ppo;
pub mod roc;
pub mod rolling;
pub mod rsi;
pub mod stc;
pub mod stochastic;
pub mod tsi;
pub mod ulcer;
pub mod ultimate;

pub use adx::Adx;
pub use atr::Atr;
pub use awesome::AwesomeOscillator;
pub use bollinger::{Bollinger, BollingerBand};
pub use cci::Cci;
pub use cmo::ChandeMomentum;
pub use donchian::{Donchian, DonchianBand};
pub use fisher::FisherTransform;
pub use keltner::{Keltner, KeltnerBand};
pub use mfi::MoneyFlowIndex;
pub use moving_average::{MaType, MovingAverage};
pub use patterns::CandlePattern;
pub use ppo::PercentagePriceOscillator;
pub use roc::Roc;
pub use rsi::Rsi;
pub use stc::SchaffTrendCycle;
pub use stochastic::{Kdj, StochRsi, Stochastic, WilliamsR};
pub use tsi::TrueStrengthIndex;
pub use ulcer::UlcerIndex;
pub use ultimate::UltimateOscillator;

use crate::domain::Bar;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warmup).
///
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Extract the close column.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Last element of a series, NaN when empty.
pub fn latest(series: &[f64]) -> f64 {
    series.last().copied().unwrap_or(f64::NAN)
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Bar {
                symbol: "TEST".to_string(),
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Create bars from explicit (open, high, low, close) tuples, volume = 1000.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            symbol: "TEST".to_string(),
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
