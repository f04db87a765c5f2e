//! End-to-end: compile a query, evaluate it against hand-built bar series.

use chrono::NaiveDate;
use screenlab_core::compiler::QueryCompiler;
use screenlab_core::condition::{CompiledQuery, ConditionError};
use screenlab_core::domain::Bar;
use screenlab_core::eval::{BenchmarkTable, EvaluationResult, Evaluator};

fn bars_from(symbol: &str, closes: &[f64]) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                symbol: symbol.to_string(),
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * 1.01,
                low: open.min(close) * 0.99,
                close,
                volume: 1_000_000.0,
            }
        })
        .collect()
}

/// 2 % compounding growth.
fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 * 1.02_f64.powi(i as i32)).collect()
}

/// 2 % compounding decline.
fn falling(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 * 0.98_f64.powi(i as i32)).collect()
}

fn compile(text: &str) -> CompiledQuery {
    QueryCompiler::new().compile(text)
}

fn run(text: &str, bars: &[Bar]) -> EvaluationResult {
    Evaluator::new()
        .evaluate(&compile(text).condition, bars)
        .unwrap()
}

#[test]
fn rsi_above_70_on_rising_and_falling() {
    let up = run("RSI above 70", &bars_from("UP", &rising(40)));
    assert!(up.pass);
    assert_eq!(up.indicator, "rsi");
    assert_eq!(up.window, Some(14));
    assert!(up.value > 70.0);

    let down = run("RSI above 70", &bars_from("DN", &falling(40)));
    assert!(!down.pass);
    assert!(down.value < 30.0);
}

#[test]
fn insufficient_history_fails_closed() {
    let r = run("RSI above 70", &bars_from("NEW", &rising(5)));
    assert!(!r.pass);
    assert!(r.value.is_nan());
}

#[test]
fn weekly_return() {
    let r = run("Weekly return above 5 %", &bars_from("UP", &rising(20)));
    assert!(r.pass);
    assert_eq!(r.indicator, "return_1w");
    assert_eq!(r.window, Some(5));
    assert!((r.value - (1.02_f64.powi(5) - 1.0)).abs() < 1e-9);
}

#[test]
fn ytd_return_uses_whole_history() {
    let r = run("YTD return below -10 %", &bars_from("DN", &falling(30)));
    assert!(r.pass);
    assert_eq!(r.window, Some(29));
}

#[test]
fn composite_and_reports_first_child() {
    let text = "RSI above 70 and weekly return above 5 %";
    let up = run(text, &bars_from("UP", &rising(40)));
    assert!(up.pass);
    assert_eq!(up.indicator, "rsi");

    let down = run(text, &bars_from("DN", &falling(40)));
    assert!(!down.pass);
}

#[test]
fn composite_or_passes_on_either() {
    let r = run(
        "RSI above 70 or YTD return below -10 %",
        &bars_from("DN", &falling(40)),
    );
    assert!(r.pass);
    // Diagnostics still come from the first child.
    assert_eq!(r.indicator, "rsi");
}

#[test]
fn price_reference_from_low() {
    // Flat at 100 for a month, then a 20 % jump.
    let mut closes = vec![100.0; 30];
    closes.push(120.0);
    let r = run("Up 15 % from 1-month low", &bars_from("JMP", &closes));
    assert!(r.pass);
    assert_eq!(r.indicator, "1m_low");
    assert!((r.value - 0.2).abs() < 1e-12);
}

#[test]
fn relative_strength_against_benchmark_symbol() {
    let spy = bars_from("SPY", &vec![50.0; 70]);
    let stock = bars_from("ACME", &vec![100.0; 70]);
    let mut table = BenchmarkTable::new();
    table.insert("SPY", &spy);
    let evaluator = Evaluator::with_benchmarks(table);

    let q = compile("Relative strength vs SPY above 1.5");
    let r = evaluator.evaluate(&q.condition, &stock).unwrap();
    assert!(r.pass);
    assert_eq!(r.indicator, "rs_vs_SPY");
    assert!((r.value - 2.0).abs() < 1e-12);
}

#[test]
fn unknown_benchmark_is_a_configuration_error() {
    let q = compile("Relative strength vs QQQ above 1.5");
    let err = Evaluator::new()
        .evaluate(&q.condition, &bars_from("ACME", &rising(70)))
        .unwrap_err();
    assert_eq!(err, ConditionError::UnknownBenchmark("QQQ".into()));
}

#[test]
fn fallback_never_passes() {
    let r = run("Oversold sentiment", &bars_from("UP", &rising(40)));
    assert!(!r.pass);
    assert_eq!(r.indicator, "fallback");
    assert_eq!(r.window, None);
}

#[test]
fn bar_order_does_not_matter() {
    let bars = bars_from("UP", &rising(40));
    let mut shuffled = bars.clone();
    shuffled.reverse();
    let a = run("RSI above 70", &bars);
    let b = run("RSI above 70", &shuffled);
    assert_eq!(a, b);
}
