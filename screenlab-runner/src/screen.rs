//! Screening driver: one compiled query over a multi-symbol bar table.
//!
//! The condition is resolved once, then every symbol is evaluated against
//! its own date-sorted bars. Symbols share nothing mutable, so evaluation
//! fans out across the rayon pool when parallelism is on. Rows come back in
//! ascending symbol order either way.

use rayon::prelude::*;
use screenlab_core::compiler::QueryCompiler;
use screenlab_core::condition::{CompiledQuery, ConditionError, Criterion};
use screenlab_core::domain::bar::sort_by_date;
use screenlab_core::domain::{Bar, DatasetHash, ScreenId};
use screenlab_core::eval::{BenchmarkTable, Evaluator};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::ScreenSettings;
use crate::report::{ReportRow, ScreenReport};

#[derive(Debug, Clone)]
pub struct ScreeningDriver {
    parallel: bool,
}

impl Default for ScreeningDriver {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl ScreeningDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &ScreenSettings) -> Self {
        Self {
            parallel: settings.parallel,
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Compile `text` and screen `bars` with the result.
    pub fn screen_text(
        &self,
        compiler: &QueryCompiler,
        text: &str,
        bars: &[Bar],
    ) -> Result<ScreenReport, ConditionError> {
        let query = compiler.compile(text);
        self.screen(&query, bars)
    }

    /// Screen every symbol in `bars` against `query`.
    ///
    /// Every loaded symbol doubles as a relative-strength benchmark. A
    /// malformed condition fails the whole screen before any symbol is
    /// evaluated; a symbol that merely fails the condition contributes no
    /// row.
    pub fn screen(&self, query: &CompiledQuery, bars: &[Bar]) -> Result<ScreenReport, ConditionError> {
        let criterion = query.condition.resolve()?;
        let evaluator = Evaluator::with_benchmarks(BenchmarkTable::from_bars(bars));
        let groups = group_by_symbol(bars);

        let dataset_hash = DatasetHash::of_bars(groups.iter().flat_map(|(_, b)| b.iter()));
        let screen_id = ScreenId::new(query.fingerprint(), dataset_hash);

        let outcomes: Vec<Option<ReportRow>> = if self.parallel {
            groups
                .par_iter()
                .map(|(symbol, bars)| screen_symbol(&evaluator, &criterion, symbol, bars))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            groups
                .iter()
                .map(|(symbol, bars)| screen_symbol(&evaluator, &criterion, symbol, bars))
                .collect::<Result<Vec<_>, _>>()?
        };

        let rows: Vec<ReportRow> = outcomes.into_iter().flatten().collect();

        info!(
            screen = %screen_id.hash(),
            category = %criterion.category(),
            symbols = groups.len(),
            passed = rows.len(),
            parallel = self.parallel,
            "screen complete"
        );

        Ok(ScreenReport {
            screen_id,
            query: query.clone(),
            symbols_scanned: groups.len(),
            rows,
        })
    }
}

/// Split a mixed bar table into per-symbol series, each ascending by date,
/// in ascending symbol order.
pub fn group_by_symbol(bars: &[Bar]) -> Vec<(String, Vec<Bar>)> {
    let mut groups: BTreeMap<&str, Vec<Bar>> = BTreeMap::new();
    for bar in bars {
        groups.entry(bar.symbol.as_str()).or_default().push(bar.clone());
    }
    groups
        .into_iter()
        .map(|(symbol, mut series)| {
            sort_by_date(&mut series);
            (symbol.to_string(), series)
        })
        .collect()
}

fn screen_symbol(
    evaluator: &Evaluator,
    criterion: &Criterion,
    symbol: &str,
    bars: &[Bar],
) -> Result<Option<ReportRow>, ConditionError> {
    let Some(latest) = bars.last() else {
        return Ok(None);
    };
    let result = evaluator.evaluate_criterion(criterion, bars)?;
    debug!(
        symbol,
        pass = result.pass,
        value = result.value,
        indicator = %result.indicator,
        "evaluated"
    );
    Ok(result.pass.then(|| ReportRow::new(latest, &result)))
}
