//! Property tests for compiler and evaluator invariants.
//!
//! Uses proptest to verify:
//! 1. Operator normalization: every known phrase maps to a canonical symbol,
//!    regardless of case and spacing
//! 2. Between inclusivity: both bounds pass, anything outside fails
//! 3. Crossover exclusivity: a bar can cross above or below, never both
//! 4. Composite truth tables: AND is all, OR is any
//! 5. Rule output: anything the rule stage emits resolves cleanly
//! 6. Evaluator totality: every category evaluates on arbitrary bars

use chrono::NaiveDate;
use proptest::prelude::*;
use screenlab_core::compiler::normalize::{normalize_op, CANONICAL_OPS, OP_PHRASES};
use screenlab_core::compiler::QueryCompiler;
use screenlab_core::condition::{
    compare, ConditionNode, Criterion, LogicalOp, Operator, Provenance, Threshold,
};
use screenlab_core::domain::Bar;
use screenlab_core::eval::Evaluator;
use screenlab_core::indicators::MaType;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(10.0..500.0_f64, len)
}

fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                symbol: "PROP".to_string(),
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0 + i as f64,
            }
        })
        .collect()
}

fn arb_phrase() -> impl Strategy<Value = (&'static str, &'static str)> {
    prop::sample::select(OP_PHRASES.to_vec())
}

// ── 1. Operator normalization ────────────────────────────────────────

proptest! {
    #[test]
    fn phrases_normalize_under_case_and_spacing(
        (phrase, symbol) in arb_phrase(),
        upper in any::<bool>(),
        pad in 1usize..4,
    ) {
        let spaced = phrase.split(' ').collect::<Vec<_>>().join(&" ".repeat(pad));
        let text = if upper { spaced.to_uppercase() } else { spaced };
        prop_assert_eq!(normalize_op(&text), Some(symbol));
        prop_assert!(CANONICAL_OPS.contains(&symbol));
    }
}

// ── 2. Between inclusivity ───────────────────────────────────────────

proptest! {
    #[test]
    fn between_includes_both_bounds(a in -1e6..1e6_f64, b in -1e6..1e6_f64, t in 0.0..=1.0_f64) {
        let (lo, hi) = (a.min(b), a.max(b));
        let range = Threshold::Range([lo, hi]);
        let op = Operator::parse("between");
        prop_assert!(compare(lo, &op, &range));
        prop_assert!(compare(hi, &op, &range));
        let inside = (lo + (hi - lo) * t).clamp(lo, hi);
        prop_assert!(compare(inside, &op, &range));
    }

    #[test]
    fn between_excludes_outside(a in -1e6..1e6_f64, b in -1e6..1e6_f64, gap in 1e-3..1e3_f64) {
        let (lo, hi) = (a.min(b), a.max(b));
        let range = Threshold::Range([lo, hi]);
        let op = Operator::parse("between");
        prop_assert!(!compare(lo - gap, &op, &range));
        prop_assert!(!compare(hi + gap, &op, &range));
    }

    #[test]
    fn nan_never_passes(op in prop::sample::select(vec![">", ">=", "<", "<=", "==", "between"]), v in -100.0..100.0_f64) {
        let threshold = if op == "between" {
            Threshold::Range([v - 1.0, v + 1.0])
        } else {
            Threshold::Scalar(v)
        };
        prop_assert!(!compare(f64::NAN, &Operator::parse(op), &threshold));
    }
}

// ── 3. Crossover exclusivity ─────────────────────────────────────────

proptest! {
    #[test]
    fn cannot_cross_both_ways(closes in arb_closes(3..60), window in 1usize..10) {
        let bars = make_bars(&closes);
        let evaluator = Evaluator::new();
        let cross = |op: &str| {
            let c = Criterion::MovingAverage {
                ma_type: MaType::Sma,
                window,
                op: Operator::parse(op),
                value: None,
            };
            evaluator.evaluate_criterion(&c, &bars).unwrap().pass
        };
        prop_assert!(!(cross("crossed_above") && cross("crossed_below")));
    }
}

// ── 4. Composite truth tables ────────────────────────────────────────

proptest! {
    #[test]
    fn and_is_all_or_is_any(passes in prop::collection::vec(any::<bool>(), 1..8)) {
        prop_assert_eq!(LogicalOp::And.combine(&passes), Some(passes.iter().all(|p| *p)));
        prop_assert_eq!(LogicalOp::Or.combine(&passes), Some(passes.iter().any(|p| *p)));
        prop_assert_eq!(LogicalOp::parse("xor").combine(&passes), None);
    }
}

// ── 5. Rule output resolves ──────────────────────────────────────────

fn arb_query() -> impl Strategy<Value = String> {
    let subject = prop::sample::select(vec![
        "rsi",
        "stochastic rsi",
        "cci",
        "williams %r",
        "mfi",
        "tsi",
        "atr",
        "ulcer index",
        "weekly return",
        "ytd return",
        "monthly performance",
    ]);
    let op = prop::sample::select(vec!["above", "below", ">=", "<", "at least", "under"]);
    let value = prop::sample::select(vec!["70", "-20", "5 %", "0.5%", "zero", "100"]);
    (subject, op, value).prop_map(|(s, o, v)| format!("{s} {o} {v}"))
}

proptest! {
    #[test]
    fn rule_output_always_resolves(text in arb_query()) {
        let q = QueryCompiler::new().compile(&text);
        prop_assert_eq!(q.provenance, Provenance::Rule);
        prop_assert!(q.condition.resolve().is_ok(), "{} did not resolve", text);
    }
}

// ── 6. Evaluator totality ────────────────────────────────────────────

fn sample_conditions() -> Vec<ConditionNode> {
    let nodes = [
        r#"{"category": 1, "indicator": "stochrsi", "op": "between", "value": [20, 80]}"#,
        r#"{"category": 1, "indicator": "fisher_transform", "op": "crossed_above", "value": 0}"#,
        r#"{"category": 2, "ma_type": "kama", "window": 10, "op": "proximity_within", "value": 0.02}"#,
        r#"{"category": 3, "benchmark": "100", "op": ">", "value": 1}"#,
        r#"{"category": 4, "reference": "52w_high", "op": "between", "value": [-0.05, 0]}"#,
        r#"{"category": 5, "indicator": "kc_width", "op": ">", "value": 1}"#,
        r#"{"category": 6, "pattern_type": "bullish_engulfing"}"#,
        r#"{"category": 7, "indicator": "donchian_breakout", "direction": "down", "window": 5}"#,
        r#"{"category": 9, "screener": "squeeze_pro"}"#,
        r#"{"category": 10, "timeframe": "3m", "op": "<", "value": 0}"#,
        r#"{"category": 8, "operator": "or", "subConditions": [
            {"category": 6, "pattern_type": "doji"},
            {"category": 9, "screener": "base_breakout", "window": 5}
        ]}"#,
    ];
    nodes
        .iter()
        .map(|n| serde_json::from_str(n).unwrap())
        .collect()
}

proptest! {
    #[test]
    fn every_category_evaluates(closes in arb_closes(1..120)) {
        let bars = make_bars(&closes);
        let evaluator = Evaluator::new();
        for node in sample_conditions() {
            let first = evaluator.evaluate(&node, &bars);
            prop_assert!(first.is_ok());
            let first = first.unwrap();
            // NaN readings never pass.
            if first.value.is_nan() {
                prop_assert!(!first.pass);
            }
            let again = evaluator.evaluate(&node, &bars).unwrap();
            prop_assert_eq!(first.pass, again.pass);
        }
    }
}
