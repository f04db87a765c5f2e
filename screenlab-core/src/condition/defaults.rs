//! Default look-back windows, keyed by indicator identifier.
//!
//! Two layers draw on this table. The compiler writes a window into the
//! condition only for the few indicators in [`COMPILER_INJECTED`]; every
//! other omission is filled by the evaluator from [`default_window`].

/// Fallback when an identifier has no entry of its own.
pub const FALLBACK_WINDOW: usize = 14;

/// Key used for relative-strength conditions, which carry no indicator id.
pub const RELATIVE_STRENGTH: &str = "relative_strength";

const DEFAULT_WINDOWS: &[(&str, usize)] = &[
    // Oscillators
    ("rsi", 14),
    ("stoch", 14),
    ("stochrsi", 14),
    ("cci", 14),
    ("williams_r", 14),
    ("awesome_osc", 34),
    ("kdj", 9),
    ("ultimate_osc", 28),
    ("chande_momentum", 14),
    ("roc", 14),
    ("money_flow_idx", 14),
    ("percentage_price_osc", 26),
    ("fisher_transform", 9),
    ("tsi", 25),
    ("schaff_trend_cycle", 10),
    // Relative strength
    (RELATIVE_STRENGTH, 60),
    // Volume / volatility
    ("volume_sma", 14),
    ("atr", 14),
    ("bb_width", 14),
    ("kc_width", 14),
    ("ui", 14),
    // Breakouts
    ("bb_breakout", 14),
    ("kc_breakout", 14),
    ("donchian_breakout", 14),
    ("pivot_break", 14),
    // Screeners
    ("base_breakout", 14),
    ("adx_trend", 14),
    ("turtle_signal", 14),
    ("squeeze_pro", 14),
];

/// Indicators whose window the compiler fills in when the text omits it.
pub const COMPILER_INJECTED: &[&str] = &["rsi", "cci", "atr"];

/// Evaluator default for `id`, or [`FALLBACK_WINDOW`] when unlisted.
pub fn default_window(id: &str) -> usize {
    DEFAULT_WINDOWS
        .iter()
        .find(|(k, _)| *k == id)
        .map_or(FALLBACK_WINDOW, |(_, w)| *w)
}

/// Window the compiler injects for `id`, if any.
pub fn injected_window(id: &str) -> Option<usize> {
    COMPILER_INJECTED
        .contains(&id)
        .then(|| default_window(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oscillator_specific_defaults() {
        assert_eq!(default_window("rsi"), 14);
        assert_eq!(default_window("fisher_transform"), 9);
        assert_eq!(default_window("kdj"), 9);
        assert_eq!(default_window("awesome_osc"), 34);
        assert_eq!(default_window("ultimate_osc"), 28);
        assert_eq!(default_window("percentage_price_osc"), 26);
        assert_eq!(default_window("tsi"), 25);
        assert_eq!(default_window("schaff_trend_cycle"), 10);
    }

    #[test]
    fn relative_strength_defaults_to_sixty() {
        assert_eq!(default_window(RELATIVE_STRENGTH), 60);
    }

    #[test]
    fn unlisted_id_uses_fallback() {
        assert_eq!(default_window("something_new"), FALLBACK_WINDOW);
    }

    #[test]
    fn compiler_injects_only_a_few() {
        assert_eq!(injected_window("rsi"), Some(14));
        assert_eq!(injected_window("cci"), Some(14));
        assert_eq!(injected_window("atr"), Some(14));
        assert_eq!(injected_window("stoch"), None);
        assert_eq!(injected_window("volume_sma"), None);
    }

    #[test]
    fn table_has_no_duplicate_keys() {
        for (i, (a, _)) in DEFAULT_WINDOWS.iter().enumerate() {
            for (b, _) in &DEFAULT_WINDOWS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
