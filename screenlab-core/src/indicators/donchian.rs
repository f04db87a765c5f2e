//! Donchian Channel over closes: highest / lowest close in the window.
//!
//! The breakout screens compare the latest close against these bands, so a
//! bar that sets a new closing extreme sits exactly on the band.
//!
//! Lookback: period - 1.

use super::rolling::{rolling_max, rolling_min};
use super::{closes, Indicator};
use crate::domain::Bar;

/// Which band of the Donchian channel to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonchianBand {
    Upper,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Donchian {
    period: usize,
    band: DonchianBand,
    name: String,
}

impl Donchian {
    pub fn upper(period: usize) -> Self {
        assert!(period >= 1, "Donchian period must be >= 1");
        Self {
            period,
            band: DonchianBand::Upper,
            name: format!("donchian_upper_{period}"),
        }
    }

    pub fn lower(period: usize) -> Self {
        assert!(period >= 1, "Donchian period must be >= 1");
        Self {
            period,
            band: DonchianBand::Lower,
            name: format!("donchian_lower_{period}"),
        }
    }
}

impl Indicator for Donchian {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = closes(bars);
        match self.band {
            DonchianBand::Upper => rolling_max(&closes, self.period),
            DonchianBand::Lower => rolling_min(&closes, self.period),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn upper_tracks_highest_close() {
        let bars = make_bars(&[10.0, 12.0, 11.0, 9.0, 13.0]);
        let upper = Donchian::upper(3).compute(&bars);
        assert!(upper[1].is_nan());
        assert_eq!(upper[2], 12.0);
        assert_eq!(upper[3], 12.0);
        assert_eq!(upper[4], 13.0);
    }

    #[test]
    fn lower_tracks_lowest_close() {
        let bars = make_bars(&[10.0, 12.0, 11.0, 9.0, 13.0]);
        let lower = Donchian::lower(3).compute(&bars);
        assert_eq!(lower[2], 10.0);
        assert_eq!(lower[4], 9.0);
    }

    #[test]
    fn new_high_sits_on_band() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let upper = Donchian::upper(3).compute(&bars);
        assert_eq!(upper[2], bars[2].close);
    }

    #[test]
    fn donchian_lookback() {
        assert_eq!(Donchian::upper(20).lookback(), 19);
        assert_eq!(Donchian::lower(1).lookback(), 0);
    }
}
