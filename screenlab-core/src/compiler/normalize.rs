//! Capture normalization shared by the rule set.

/// Natural-language comparison phrases and the symbol each stands for.
///
/// Symbols map to themselves so a captured `>=` normalizes like a phrase.
pub const OP_PHRASES: &[(&str, &str)] = &[
    (">=", ">="),
    ("<=", "<="),
    ("==", "=="),
    (">", ">"),
    ("<", "<"),
    ("=", "=="),
    ("greater than or equal to", ">="),
    ("at least", ">="),
    ("no less than", ">="),
    ("not below", ">="),
    ("less than or equal to", "<="),
    ("at most", "<="),
    ("no more than", "<="),
    ("not above", "<="),
    ("greater than", ">"),
    ("more than", ">"),
    ("higher than", ">"),
    ("above", ">"),
    ("over", ">"),
    ("exceeds", ">"),
    ("less than", "<"),
    ("lower than", "<"),
    ("below", "<"),
    ("under", "<"),
    ("equal to", "=="),
    ("equals", "=="),
];

/// The six canonical comparison symbols.
pub const CANONICAL_OPS: [&str; 6] = [">", ">=", "<", "<=", "==", "between"];

/// Regex alternation over every phrase, longest first so that
/// "greater than or equal to" is never cut short at "greater than".
pub fn op_pattern() -> String {
    let mut phrases: Vec<&str> = OP_PHRASES.iter().map(|(p, _)| *p).collect();
    phrases.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alts: Vec<String> = phrases
        .iter()
        .map(|p| regex::escape(p).replace(' ', r"\s+"))
        .collect();
    format!("(?:{})", alts.join("|"))
}

/// Map a captured phrase to its symbol. Whitespace runs are collapsed first.
pub fn normalize_op(raw: &str) -> Option<&'static str> {
    let folded = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    OP_PHRASES
        .iter()
        .find(|(p, _)| *p == folded)
        .map(|(_, sym)| *sym)
}

/// Numeric literal as it appears in query text: `70`, `-0.5`, `5 %`, `zero`.
pub const NUMBER_PATTERN: &str = r"(?:[-−]?\d+(?:\.\d+)?(?:\s*%)?|zero)";

/// Parse a [`NUMBER_PATTERN`] capture. A trailing `%` divides by 100.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("zero") {
        return Some(0.0);
    }
    let s = s.replace('−', "-");
    match s.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok().map(|v| v / 100.0),
        None => s.parse::<f64>().ok(),
    }
}

/// `up` / `down` as a crossover operator.
pub fn crossover_op(direction: &str) -> Option<&'static str> {
    match direction {
        "up" | "above" => Some("crossed_above"),
        "down" | "below" => Some("crossed_below"),
        _ => None,
    }
}

/// Fold spelled-out reference horizons (`1-month`, `52 week`) to `1m`, `52w`.
pub fn reference_horizon(raw: &str) -> Option<&'static str> {
    let compact: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    match compact.as_str() {
        "1d" | "1day" => Some("1d"),
        "1w" | "1wk" | "1week" => Some("1w"),
        "1m" | "1mo" | "1month" => Some("1m"),
        "52w" | "52wk" | "52week" => Some("52w"),
        _ => None,
    }
}

/// Fold a return-horizon phrase to a timeframe id.
pub fn timeframe_id(raw: &str) -> Option<&'static str> {
    let compact: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    match compact.as_str() {
        "daily" | "1d" | "1day" => Some("1d"),
        "weekly" | "1w" | "1week" => Some("1w"),
        "monthly" | "1m" | "1month" => Some("1m"),
        "quarterly" | "3m" | "3month" | "3months" => Some("3m"),
        "halfyearly" | "6m" | "6month" | "6months" => Some("6m"),
        "yearly" | "annual" | "1y" | "1year" => Some("1y"),
        "ytd" | "yeartodate" => Some("ytd"),
        _ => None,
    }
}

/// Moving-average spellings to their type id.
pub fn ma_type_id(raw: &str) -> Option<&'static str> {
    let compact: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    match compact.as_str() {
        "sma" => Some("sma"),
        "ema" => Some("ema"),
        "wma" => Some("wma"),
        "hma" | "hull" | "hullma" => Some("hma"),
        "rma" => Some("rma"),
        "dema" => Some("dema"),
        "tema" => Some("tema"),
        "kama" => Some("kama"),
        "zlma" | "zerolag" | "zerolagma" => Some("zlma"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn phrases_map_to_canonical_symbols() {
        for (phrase, sym) in OP_PHRASES {
            assert!(CANONICAL_OPS.contains(sym), "{phrase} -> {sym}");
            assert_eq!(normalize_op(phrase), Some(*sym));
        }
    }

    #[test]
    fn no_phrase_listed_twice() {
        for (i, (a, _)) in OP_PHRASES.iter().enumerate() {
            for (b, _) in &OP_PHRASES[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn longest_phrase_wins_in_pattern() {
        let re = regex::Regex::new(&format!("^{}", op_pattern())).unwrap();
        let m = re.find("greater than or equal to 5").unwrap();
        assert_eq!(m.as_str(), "greater than or equal to");
        let m = re.find(">= 5").unwrap();
        assert_eq!(m.as_str(), ">=");
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(normalize_op("at   least"), Some(">="));
        assert_eq!(normalize_op("ABOVE"), Some(">"));
        assert_eq!(normalize_op("roughly"), None);
    }

    #[test]
    fn percent_divides_by_hundred() {
        assert_approx(parse_number("5%").unwrap(), 0.05, 1e-12);
        assert_approx(parse_number("0.5 %").unwrap(), 0.005, 1e-12);
        assert_approx(parse_number("-10 %").unwrap(), -0.1, 1e-12);
        assert_eq!(parse_number("70"), Some(70.0));
        assert_eq!(parse_number("zero"), Some(0.0));
        assert_eq!(parse_number("−20"), Some(-20.0));
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn horizons_fold() {
        assert_eq!(reference_horizon("1-month"), Some("1m"));
        assert_eq!(reference_horizon("52 week"), Some("52w"));
        assert_eq!(reference_horizon("3m"), None);
        assert_eq!(timeframe_id("year-to-date"), Some("ytd"));
        assert_eq!(timeframe_id("half-yearly"), Some("6m"));
        assert_eq!(ma_type_id("zero-lag ma"), Some("zlma"));
        assert_eq!(ma_type_id("hull ma"), Some("hma"));
    }
}
