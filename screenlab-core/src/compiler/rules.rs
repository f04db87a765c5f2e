//! Ordered pattern rules: the deterministic first stage of the compiler.
//!
//! Rules are tried strictly in list order over case-folded text and the
//! first one that matches and builds a condition wins. Where one trigger is
//! a textual superset of another ("stochastic rsi" vs "rsi", a Fisher
//! crossover vs a Fisher threshold) the more specific rule is listed first.

use super::normalize::{
    crossover_op, ma_type_id, normalize_op, op_pattern, parse_number, reference_horizon,
    timeframe_id, NUMBER_PATTERN,
};
use crate::condition::defaults::injected_window;
use crate::condition::{Category, ConditionNode, LogicalOp, Threshold};
use regex::{Captures, Regex};
use std::fmt;
use std::sync::{Arc, LazyLock};

type Builder = dyn Fn(&Captures<'_>) -> Option<ConditionNode> + Send + Sync;

/// One trigger pattern and the condition it builds.
#[derive(Clone)]
pub struct Rule {
    name: &'static str,
    pattern: Regex,
    build: Arc<Builder>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

impl Rule {
    pub fn new(
        name: &'static str,
        pattern: &str,
        build: impl Fn(&Captures<'_>) -> Option<ConditionNode> + Send + Sync + 'static,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            build: Arc::new(build),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Match and build. A trigger whose captures do not normalize is a miss.
    pub fn apply(&self, text: &str) -> Option<ConditionNode> {
        let caps = self.pattern.captures(text)?;
        let mut node = (self.build)(&caps)?;
        if node.window.is_none() {
            node.window = node.indicator.as_deref().and_then(injected_window);
        }
        Some(node)
    }
}

/// A successful rule-stage compile.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    /// Name of the winning rule, or `composite`.
    pub rule: &'static str,
    /// Flat condition (composite children are flat too).
    pub node: ConditionNode,
}

#[derive(Debug, Clone)]
pub struct PatternRuleSet {
    rules: Vec<Rule>,
}

impl Default for PatternRuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl PatternRuleSet {
    /// The built-in vocabulary.
    pub fn standard() -> Self {
        Self {
            rules: STANDARD_RULES.clone(),
        }
    }

    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Composite first, then the single-condition rules. `None` is a miss.
    pub fn match_text(&self, text: &str) -> Option<RuleMatch> {
        let folded = fold(text);
        self.match_composite(&folded)
            .or_else(|| self.match_single(&folded))
    }

    /// First single-condition rule that matches already-folded text.
    pub fn match_single(&self, folded: &str) -> Option<RuleMatch> {
        self.rules.iter().find_map(|rule| {
            rule.apply(folded).map(|node| RuleMatch {
                rule: rule.name,
                node,
            })
        })
    }

    fn match_composite(&self, folded: &str) -> Option<RuleMatch> {
        let (operator, parts) = split_connective(folded)?;
        let children = parts
            .iter()
            .map(|p| self.match_single(p).map(|m| m.node))
            .collect::<Option<Vec<_>>>()?;
        Some(RuleMatch {
            rule: "composite",
            node: ConditionNode::composite(operator, children),
        })
    }
}

/// Lower-case, trim and collapse whitespace.
pub fn fold(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

static CONNECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(and|or)\s+").expect("connective pattern is valid"));

static BARE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{NUMBER_PATTERN}$")).expect("number pattern is valid")
});

/// Split on a single kind of connective. A part that is just a number is
/// the upper bound of a `between x and y` and is glued back on; the `and`
/// in front of it does not count as a connective.
fn split_connective(text: &str) -> Option<(LogicalOp, Vec<String>)> {
    let mut pieces: Vec<&str> = Vec::new();
    let mut words: Vec<&str> = Vec::new();
    let mut last = 0;
    for caps in CONNECTIVE.captures_iter(text) {
        let (Some(whole), Some(word)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        pieces.push(&text[last..whole.start()]);
        words.push(word.as_str());
        last = whole.end();
    }
    pieces.push(&text[last..]);

    let mut parts: Vec<String> = vec![pieces[0].to_string()];
    let mut kind: Option<&str> = None;
    for (piece, word) in pieces[1..].iter().zip(&words) {
        if *word == "and" && BARE_NUMBER.is_match(piece.trim()) {
            parts.last_mut()?.push_str(&format!(" and {piece}"));
            continue;
        }
        match kind {
            None => kind = Some(*word),
            Some(k) if k == *word => {}
            Some(_) => return None,
        }
        parts.push(piece.to_string());
    }

    if parts.len() < 2 || parts.iter().any(|p| p.trim().is_empty()) {
        return None;
    }
    Some((LogicalOp::parse(kind?), parts))
}

// ─── Capture helpers ─────────────────────────────────────────────────

fn cap<'t>(caps: &Captures<'t>, name: &str) -> Option<&'t str> {
    caps.name(name).map(|m| m.as_str())
}

/// Window from any of the capture names rules use for it.
fn window(caps: &Captures<'_>) -> Option<usize> {
    ["window", "pre", "post"]
        .iter()
        .find_map(|n| cap(caps, n))
        .and_then(|w| w.parse().ok())
}

/// `(op, value)` from either an `op value` or a `low .. high` capture.
fn threshold(caps: &Captures<'_>) -> Option<(String, Threshold)> {
    if let (Some(lo), Some(hi)) = (cap(caps, "low"), cap(caps, "high")) {
        let (lo, hi) = (parse_number(lo)?, parse_number(hi)?);
        return Some(("between".into(), Threshold::Range([lo.min(hi), lo.max(hi)])));
    }
    let op = normalize_op(cap(caps, "op")?)?;
    let value = parse_number(cap(caps, "value")?)?;
    Some((op.into(), Threshold::Scalar(value)))
}

fn node(category: Category) -> ConditionNode {
    ConditionNode::new(category)
}

// ─── Pattern fragments ───────────────────────────────────────────────

/// `14-day` / `14 period` ahead of an indicator name.
const PRE: &str = r"(?:\b(?P<pre>\d+)[-\s]?(?:day|period|bar)s?\s+)?";
/// `14` / `(14)` right after an indicator name.
const WIN: &str = r"(?:\s*\(?\s*(?P<window>\d+)\b\s*\)?)?";
const MA: &str =
    r"\b(?P<ma>sma|ema|wma|hma|rma|dema|tema|kama|zlma|hull(?:\s+ma)?|zero[-\s]?lag(?:\s+ma)?)\b";
const REF: &str = r"(?P<ref>(?:1|52)[-\s]?(?:day|week|wk|month|mo|d|w|m))";
const BENCHMARK: &str = r"(?P<benchmark>[a-z0-9^._]+)";

fn thresh() -> String {
    let op = op_pattern();
    let num = NUMBER_PATTERN;
    format!(
        r"(?:(?:is\s+)?(?P<op>{op})\s*(?P<value>{num})|(?:between\s+|from\s+)?(?P<low>{num})\s*(?:and|to|-)\s*(?P<high>{num}))"
    )
}

fn op_value() -> String {
    format!(
        r"(?:is\s+)?(?P<op>{})\s*(?P<value>{NUMBER_PATTERN})",
        op_pattern()
    )
}

// ─── Rule builders ───────────────────────────────────────────────────

/// Category-1 threshold on a named oscillator.
fn oscillator(name: &'static str, id: &'static str, trigger: &str) -> Result<Rule, regex::Error> {
    let pattern = format!(r"{PRE}\b(?:{trigger})\b{WIN}.*?{}", thresh());
    Rule::new(name, &pattern, move |caps| {
        let (op, value) = threshold(caps)?;
        Some(ConditionNode {
            indicator: Some(id.into()),
            window: window(caps),
            op: Some(op),
            value: Some(value),
            ..node(Category::IndicatorThreshold)
        })
    })
}

/// Category-5 threshold on a volume/volatility measure.
fn volatility(name: &'static str, id: &'static str, trigger: &str) -> Result<Rule, regex::Error> {
    let pattern = format!(r"{PRE}\b(?:{trigger})\b{WIN}.*?{}", thresh());
    Rule::new(name, &pattern, move |caps| {
        let (op, value) = threshold(caps)?;
        Some(ConditionNode {
            indicator: Some(id.into()),
            window: window(caps),
            op: Some(op),
            value: Some(value),
            ..node(Category::VolumeVolatility)
        })
    })
}

fn pattern(name: &'static str, id: &'static str, trigger: &str) -> Result<Rule, regex::Error> {
    let pattern = format!(r"\b(?:(?P<dir>bullish|bearish)\s+)?(?:{trigger})\b");
    Rule::new(name, &pattern, move |caps| {
        let pattern_type = match cap(caps, "dir") {
            Some(dir) => format!("{dir}_{id}"),
            None => id.to_string(),
        };
        Some(ConditionNode {
            pattern_type: Some(pattern_type),
            ..node(Category::CandlePattern)
        })
    })
}

fn channel_breakout(
    name: &'static str,
    id: &'static str,
    trigger: &str,
) -> Result<Rule, regex::Error> {
    let pattern = format!(
        r"\b(?:{trigger})\s+(?:(?P<side>upside|downside)\s+)?break(?:out)?\b(?:\s+(?P<dir>up|down)\b)?"
    );
    Rule::new(name, &pattern, move |caps| breakout_node(id, caps))
}

fn breakout_node(id: &str, caps: &Captures<'_>) -> Option<ConditionNode> {
    let captured = cap(caps, "dir").or(match cap(caps, "side") {
        Some("upside") => Some("up"),
        Some("downside") => Some("down"),
        _ => None,
    });
    Some(ConditionNode {
        indicator: Some(id.into()),
        window: window(caps),
        direction: Some(captured.unwrap_or("up").into()),
        op: captured.and_then(crossover_op).map(Into::into),
        ..node(Category::Breakout)
    })
}

fn screener(name: &'static str, id: &'static str, trigger: &str) -> Result<Rule, regex::Error> {
    let pattern = format!(r"\b(?:{trigger})\b");
    Rule::new(name, &pattern, move |caps| {
        Some(ConditionNode {
            screener: Some(id.into()),
            direction: cap(caps, "dir").map(Into::into),
            window: window(caps),
            ..node(Category::Screener)
        })
    })
}

/// Price-vs-MA operator phrase to its wire operator.
fn ma_op(raw: &str) -> Option<&'static str> {
    let words: Vec<&str> = raw.split_whitespace().collect();
    match words.as_slice() {
        [cross, dir] if cross.starts_with("cross") => crossover_op(dir),
        ["above"] => Some(">"),
        ["below"] => Some("<"),
        _ => None,
    }
}

fn ma_node(caps: &Captures<'_>, op: &str, value: Option<Threshold>) -> Option<ConditionNode> {
    Some(ConditionNode {
        ma_type: Some(ma_type_id(cap(caps, "ma")?)?.into()),
        window: Some(window(caps)?),
        op: Some(op.into()),
        value,
        ..node(Category::MovingAverage)
    })
}

fn reference_node(reference: String, op: &str, value: Threshold) -> ConditionNode {
    ConditionNode {
        reference: Some(reference),
        op: Some(op.into()),
        value: Some(value),
        ..node(Category::PriceReference)
    }
}

fn relative_strength(caps: &Captures<'_>) -> Option<ConditionNode> {
    let (op, value) = threshold(caps)?;
    Some(ConditionNode {
        benchmark: Some(cap(caps, "benchmark")?.to_ascii_uppercase()),
        op: Some(op),
        value: Some(value),
        ..node(Category::RelativeStrength)
    })
}

// ─── Standard vocabulary ─────────────────────────────────────────────

static STANDARD_RULES: LazyLock<Vec<Rule>> =
    LazyLock::new(|| standard_rules().expect("built-in rule patterns are valid"));

fn standard_rules() -> Result<Vec<Rule>, regex::Error> {
    const MA_CROSS_OP: &str = r"(?P<maop>cross(?:ed|es)?\s+above|cross(?:ed|es)?\s+below|above|below)";
    const PRICE_LEAD: &str = r"(?:^|\b(?:price|close)\s+(?:is\s+)?)";
    let num = NUMBER_PATTERN;
    let op_value = op_value();

    Ok(vec![
        // 1. Indicator thresholds, most specific trigger first.
        oscillator("stochrsi_threshold", "stochrsi", r"stoch(?:astic)?[\s-]*rsi")?,
        oscillator("rsi_threshold", "rsi", r"rsi|relative\s+strength\s+index")?,
        oscillator("kdj_threshold", "kdj", r"kdj")?,
        oscillator("stoch_threshold", "stoch", r"stoch(?:astic)?")?,
        oscillator("cci_threshold", "cci", r"cci|commodity\s+channel\s+index")?,
        oscillator("williams_r_threshold", "williams_r", r"williams\s*%?\s*r\b")?,
        Rule::new(
            "awesome_osc_sign",
            r"\b(?:awesome\s+oscillator|ao)\b.*?\b(?P<sign>positive|negative)\b",
            |caps| {
                let op = if cap(caps, "sign")? == "positive" { ">" } else { "<" };
                Some(ConditionNode {
                    indicator: Some("awesome_osc".into()),
                    op: Some(op.into()),
                    value: Some(Threshold::Scalar(0.0)),
                    ..node(Category::IndicatorThreshold)
                })
            },
        )?,
        oscillator("awesome_osc_threshold", "awesome_osc", r"awesome\s+oscillator|ao")?,
        oscillator("ultimate_osc_threshold", "ultimate_osc", r"ultimate\s+oscillator|uo")?,
        oscillator(
            "chande_momentum_threshold",
            "chande_momentum",
            r"chande\s+momentum(?:\s+oscillator)?|cmo",
        )?,
        oscillator("roc_threshold", "roc", r"roc|rate\s+of\s+change")?,
        oscillator("money_flow_idx_threshold", "money_flow_idx", r"money\s+flow\s+index|mfi")?,
        oscillator(
            "ppo_threshold",
            "percentage_price_osc",
            r"percentage\s+price\s+oscillator|ppo",
        )?,
        Rule::new(
            "fisher_crossover",
            &format!(
                r"\b(?:fisher\s+transform|fisher){WIN}.*?\bcross(?:ed|es)?\s+(?P<dir>above|below)\s+(?P<value>{num})"
            ),
            |caps| {
                Some(ConditionNode {
                    indicator: Some("fisher_transform".into()),
                    window: window(caps),
                    op: Some(crossover_op(cap(caps, "dir")?)?.into()),
                    value: Some(Threshold::Scalar(parse_number(cap(caps, "value")?)?)),
                    ..node(Category::IndicatorThreshold)
                })
            },
        )?,
        oscillator("fisher_threshold", "fisher_transform", r"fisher\s+transform|fisher")?,
        oscillator("tsi_threshold", "tsi", r"tsi|true\s+strength\s+index")?,
        oscillator("stc_threshold", "schaff_trend_cycle", r"schaff\s+trend\s+cycle|stc")?,
        // 2. Price vs moving average.
        Rule::new(
            "price_vs_ma",
            &format!(r"{PRICE_LEAD}{MA_CROSS_OP}\s+(?:the\s+|its\s+)?{MA}\s*\(?\s*(?P<window>\d+)\b"),
            |caps| ma_node(caps, ma_op(cap(caps, "maop")?)?, None),
        )?,
        Rule::new(
            "price_vs_ma_prefixed",
            &format!(
                r"{PRICE_LEAD}{MA_CROSS_OP}\s+(?:the\s+|its\s+)?(?P<pre>\d+)[-\s]?(?:day\s+)?{MA}"
            ),
            |caps| ma_node(caps, ma_op(cap(caps, "maop")?)?, None),
        )?,
        Rule::new(
            "ma_vs_price",
            &format!(r"{MA}\s*(?P<window>\d+)\s+(?:is\s+)?(?P<maop>above|below)\s+(?:the\s+)?price\b"),
            |caps| {
                // MA above price means price below MA.
                let op = match cap(caps, "maop")? {
                    "above" => "<",
                    _ => ">",
                };
                ma_node(caps, op, None)
            },
        )?,
        Rule::new(
            "ma_proximity",
            &format!(r"\bwithin\s+(?P<value>{num})\s+of\s+(?:the\s+|its\s+)?{MA}\s*(?P<window>\d+)\b"),
            |caps| {
                let tolerance = parse_number(cap(caps, "value")?)?;
                ma_node(caps, "proximity_within", Some(Threshold::Scalar(tolerance)))
            },
        )?,
        Rule::new(
            "ma_proximity_trailing",
            &format!(r"{MA}\s*(?P<window>\d+)\s+(?:proximity\s+)?within\s+(?P<value>{num})"),
            |caps| {
                let tolerance = parse_number(cap(caps, "value")?)?;
                ma_node(caps, "proximity_within", Some(Threshold::Scalar(tolerance)))
            },
        )?,
        // 3. Relative strength.
        Rule::new(
            "rs_vs_benchmark",
            &format!(
                r"\b(?:rs|relative\s+strength)(?:\s+line)?\s+(?:vs\.?|versus|against)\s+{BENCHMARK}\s*{op_value}"
            ),
            relative_strength,
        )?,
        Rule::new(
            "rs_line_vs_benchmark",
            &format!(
                r"\b(?:rs|relative\s+strength)(?:\s+line)?\s+{op_value}\s+(?:vs\.?|versus|against)\s+{BENCHMARK}"
            ),
            relative_strength,
        )?,
        // 4. Percent change from a reference extreme.
        Rule::new(
            "up_from_low",
            &format!(
                r"\b(?:up|above|gained?)\s+(?P<value>{num})\s+(?:from|off)\s+(?:the\s+|its\s+)?{REF}[-_\s]?lows?\b"
            ),
            |caps| {
                let horizon = reference_horizon(cap(caps, "ref")?)?;
                let value = parse_number(cap(caps, "value")?)?;
                Some(reference_node(
                    format!("{horizon}_low"),
                    ">",
                    Threshold::Scalar(value),
                ))
            },
        )?,
        Rule::new(
            "down_from_high",
            &format!(
                r"\b(?:down|below|off)\s+(?P<value>{num})\s+from\s+(?:the\s+|its\s+)?{REF}[-_\s]?highs?\b"
            ),
            |caps| {
                if reference_horizon(cap(caps, "ref")?)? != "52w" {
                    return None;
                }
                let value = parse_number(cap(caps, "value")?)?;
                Some(reference_node(
                    "52w_high".into(),
                    "<=",
                    Threshold::Scalar(-value.abs()),
                ))
            },
        )?,
        Rule::new(
            "within_of_high",
            &format!(
                r"\bwithin\s+(?P<value>{num})\s+of\s+(?:the\s+|its\s+)?{REF}[-_\s]?highs?\b"
            ),
            |caps| {
                if reference_horizon(cap(caps, "ref")?)? != "52w" {
                    return None;
                }
                let value = parse_number(cap(caps, "value")?)?.abs();
                Some(reference_node(
                    "52w_high".into(),
                    "between",
                    Threshold::Range([-value, 0.0]),
                ))
            },
        )?,
        // 5. Volume and volatility.
        volatility("atr_threshold", "atr", r"atr|average\s+true\s+range")?,
        Rule::new(
            "volume_spike",
            r"\bvolume\s+(?:spike|surge)\s+(?:of\s+)?(?P<value>\d+(?:\.\d+)?)\s*(?:x|×|times)\s*(?:(?:its|the)\s+)?(?:(?P<pre>\d+)[-\s]?day\s+)?(?:sma|average|avg|ma)\b(?:\s*\(?\s*(?P<post>\d+)\b)?",
            |caps| {
                Some(ConditionNode {
                    indicator: Some("volume_sma".into()),
                    window: window(caps),
                    op: Some(">=".into()),
                    value: Some(Threshold::Scalar(parse_number(cap(caps, "value")?)?)),
                    ..node(Category::VolumeVolatility)
                })
            },
        )?,
        volatility(
            "bb_width_threshold",
            "bb_width",
            r"(?:bb|bollinger(?:\s+bands?)?)\s+width",
        )?,
        volatility(
            "kc_width_threshold",
            "kc_width",
            r"(?:kc|keltner(?:\s+channels?)?)\s+width",
        )?,
        volatility("ulcer_threshold", "ui", r"ulcer\s+index|ui")?,
        volatility("volume_threshold", "volume", r"volume")?,
        // 6. Candle patterns.
        pattern("engulfing", "engulfing", r"engulfing")?,
        pattern("doji", "doji", r"doji")?,
        pattern("hammer", "hammer", r"hammer")?,
        pattern("nr7", "nr7", r"nr[-\s]?7|narrow\s+range\s+7")?,
        pattern("inside_bar", "inside_bar", r"inside\s+(?:bar|day)")?,
        pattern("outside_bar", "outside_bar", r"outside\s+(?:bar|day)")?,
        // 7. Channel breakouts.
        channel_breakout("bb_breakout", "bb_breakout", r"bb|bollinger(?:\s+bands?)?")?,
        channel_breakout("kc_breakout", "kc_breakout", r"kc|keltner(?:\s+channels?)?")?,
        Rule::new(
            "donchian_breakout",
            r"\bdonchian(?:\s+channel)?\s*(?:(?P<window>\d+)[-\s]?(?:day\s+)?)?break(?:out)?\b(?:\s+(?P<dir>up|down)\b)?",
            |caps| breakout_node("donchian_breakout", caps),
        )?,
        Rule::new(
            "pivot_breakout",
            r"\bpivot(?:\s+point)?\s+break(?:out)?\b(?:\s+(?P<dir>up|down)\b)?",
            |caps| breakout_node("pivot_break", caps),
        )?,
        // 9. Named screeners.
        screener("base_breakout", "base_breakout", r"base\s+breakout")?,
        screener("turtle_signal", "turtle_signal", r"turtle\s+(?:soup|signal)")?,
        screener(
            "adx_trend",
            "adx_trend",
            r"adx\s+trend(?:\s+(?P<dir>long|short|strong))?",
        )?,
        screener("squeeze", "squeeze_pro", r"(?:ttm\s+)?squeeze(?:\s+pro)?")?,
        // 10. Period returns.
        Rule::new(
            "period_return",
            &format!(
                r"\b(?P<tf>daily|weekly|monthly|quarterly|half[-\s]?yearly|yearly|annual|ytd|year[-\s]to[-\s]date|1[-\s]?(?:day|d|week|w|month|m|year|y)|[36][-\s]?(?:months?|m))\s+(?:return|performance|change)s?\s*{op_value}"
            ),
            |caps| {
                let (op, value) = threshold(caps)?;
                Some(ConditionNode {
                    timeframe: Some(timeframe_id(cap(caps, "tf")?)?.into()),
                    op: Some(op),
                    value: Some(value),
                    ..node(Category::PeriodReturn)
                })
            },
        )?,
    ])
}
