//! Bar: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol on a single day.
///
/// Volume is kept as `f64` so fractional share counts and volume ratios
/// flow through the indicator library without conversions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }

    /// Midpoint of the bar's range, `(high + low) / 2`.
    pub fn median_price(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Typical price, `(high + low + close) / 3`.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Sort a bar slice ascending by date, keeping the input order for ties.
///
/// Returns `true` when the slice had to be reordered.
pub fn sort_by_date(bars: &mut [Bar]) -> bool {
    if bars.windows(2).all(|w| w[0].date <= w[1].date) {
        return false;
    }
    bars.sort_by_key(|b| b.date);
    true
}
