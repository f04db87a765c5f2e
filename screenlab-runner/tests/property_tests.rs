//! Property tests for the screening driver.

use chrono::NaiveDate;
use proptest::prelude::*;
use screenlab_core::condition::{CompiledQuery, ConditionNode};
use screenlab_core::domain::Bar;
use screenlab_runner::{group_by_symbol, ScreeningDriver};

const SYMBOLS: [&str; 5] = ["AAA", "BBB", "CCC", "DDD", "EEE"];

fn bars_for(symbol: &str, closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            symbol: symbol.to_string(),
            date: base + chrono::Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 10_000.0,
        })
        .collect()
}

fn price_above_sma(window: usize) -> CompiledQuery {
    let node: ConditionNode = serde_json::from_value(serde_json::json!({
        "category": 2, "ma_type": "sma", "window": window, "op": ">"
    }))
    .unwrap();
    CompiledQuery::from_rule(node)
}

fn arb_universe() -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec(prop::collection::vec(10.0..200.0f64, 1..40), SYMBOLS.len()).prop_map(
        |series| {
            series
                .iter()
                .zip(SYMBOLS)
                .flat_map(|(closes, symbol)| bars_for(symbol, closes))
                .collect()
        },
    )
}

proptest! {
    /// Report rows never depend on input order or on parallel scheduling.
    #[test]
    fn report_is_order_and_schedule_independent(
        bars in arb_universe(),
        window in 2usize..10,
        seed in any::<u64>(),
    ) {
        let query = price_above_sma(window);
        let sequential = ScreeningDriver::new()
            .with_parallelism(false)
            .screen(&query, &bars)
            .unwrap();

        // Deterministic permutation from the seed
        let mut shuffled = bars.clone();
        let n = shuffled.len();
        let mut state = seed;
        for i in (1..n).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let j = (state >> 33) as usize % (i + 1);
            shuffled.swap(i, j);
        }
        let parallel = ScreeningDriver::new().screen(&query, &shuffled).unwrap();

        prop_assert_eq!(&sequential.rows, &parallel.rows);
        prop_assert_eq!(sequential.symbols_scanned, SYMBOLS.len());
    }

    /// Rows are strictly ascending by symbol and each one is that symbol's
    /// latest bar.
    #[test]
    fn rows_are_sorted_latest_bars(bars in arb_universe(), window in 2usize..10) {
        let report = ScreeningDriver::new().screen(&price_above_sma(window), &bars).unwrap();
        let groups = group_by_symbol(&bars);

        for pair in report.rows.windows(2) {
            prop_assert!(pair[0].symbol < pair[1].symbol);
        }
        for row in &report.rows {
            let (_, series) = groups.iter().find(|(s, _)| *s == row.symbol).unwrap();
            let latest = series.last().unwrap();
            prop_assert_eq!(row.date, latest.date);
            prop_assert_eq!(row.close, latest.close);
            prop_assert!(row.indicator_value.is_some_and(|v| v > 0.0));
        }
    }
}
