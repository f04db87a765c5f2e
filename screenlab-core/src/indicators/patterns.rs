//! Candle-pattern recognizers.
//!
//! Each recognizer maps a bar series to signed codes per bar: `+100`
//! bullish, `-100` bearish, `0` no pattern. Single-direction patterns
//! (doji, hammer, NR7) only ever emit `+100`.

use crate::domain::Bar;
use serde::{Deserialize, Serialize};

pub const BULLISH: i32 = 100;
pub const BEARISH: i32 = -100;

/// Doji body must be at most this fraction of the bar's range.
const DOJI_BODY_RATIO: f64 = 0.1;
/// NR7 compares the current range with the previous six.
const NARROW_RANGE_BARS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandlePattern {
    Engulfing,
    Doji,
    Hammer,
    Nr7,
    InsideBar,
    OutsideBar,
}

fn body(bar: &Bar) -> f64 {
    (bar.close - bar.open).abs()
}

fn range(bar: &Bar) -> f64 {
    bar.high - bar.low
}

fn color(bar: &Bar) -> i32 {
    if bar.close >= bar.open {
        BULLISH
    } else {
        BEARISH
    }
}

impl CandlePattern {
    pub const ALL: [CandlePattern; 6] = [
        CandlePattern::Engulfing,
        CandlePattern::Doji,
        CandlePattern::Hammer,
        CandlePattern::Nr7,
        CandlePattern::InsideBar,
        CandlePattern::OutsideBar,
    ];

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CandlePattern::Engulfing => "engulfing",
            CandlePattern::Doji => "doji",
            CandlePattern::Hammer => "hammer",
            CandlePattern::Nr7 => "nr7",
            CandlePattern::InsideBar => "inside_bar",
            CandlePattern::OutsideBar => "outside_bar",
        }
    }

    /// Bars of history needed before bar t can carry a code.
    pub fn lookback(&self) -> usize {
        match self {
            CandlePattern::Doji | CandlePattern::Hammer => 0,
            CandlePattern::Nr7 => NARROW_RANGE_BARS - 1,
            _ => 1,
        }
    }

    /// Signed pattern code for every bar.
    pub fn codes(&self, bars: &[Bar]) -> Vec<i32> {
        (0..bars.len()).map(|i| self.code_at(bars, i)).collect()
    }

    fn code_at(&self, bars: &[Bar], i: usize) -> i32 {
        if i < self.lookback() || bars[i].is_void() {
            return 0;
        }
        let cur = &bars[i];
        match self {
            CandlePattern::Engulfing => {
                let prev = &bars[i - 1];
                if body(cur) <= body(prev) {
                    0
                } else if prev.close < prev.open
                    && cur.close > cur.open
                    && cur.open <= prev.close
                    && cur.close >= prev.open
                {
                    BULLISH
                } else if prev.close > prev.open
                    && cur.close < cur.open
                    && cur.open >= prev.close
                    && cur.close <= prev.open
                {
                    BEARISH
                } else {
                    0
                }
            }
            CandlePattern::Doji => {
                let r = range(cur);
                if r > 0.0 && body(cur) <= DOJI_BODY_RATIO * r {
                    BULLISH
                } else {
                    0
                }
            }
            CandlePattern::Hammer => {
                let b = body(cur);
                let lower = cur.open.min(cur.close) - cur.low;
                let upper = cur.high - cur.open.max(cur.close);
                if lower > 0.0 && lower >= 2.0 * b && upper <= b.max(DOJI_BODY_RATIO * range(cur)) {
                    BULLISH
                } else {
                    0
                }
            }
            CandlePattern::Nr7 => {
                let r = range(cur);
                let narrowest = bars[i + 1 - NARROW_RANGE_BARS..i]
                    .iter()
                    .all(|b| r <= range(b));
                if narrowest {
                    BULLISH
                } else {
                    0
                }
            }
            CandlePattern::InsideBar => {
                let prev = &bars[i - 1];
                if cur.high < prev.high && cur.low > prev.low {
                    color(cur)
                } else {
                    0
                }
            }
            CandlePattern::OutsideBar => {
                let prev = &bars[i - 1];
                if cur.high > prev.high && cur.low < prev.low {
                    color(cur)
                } else {
                    0
                }
            }
        }
    }
}
