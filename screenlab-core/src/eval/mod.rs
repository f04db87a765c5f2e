//! Condition evaluation against one symbol's bar history.
//!
//! The evaluator resolves a condition tree once, orders the bars by date
//! when needed, and hands off to the per-category functions in
//! [`dispatch`]. It holds no mutable state, so one instance can be shared
//! across worker threads.

pub mod benchmark;
mod dispatch;

pub use benchmark::{Benchmark, BenchmarkTable};

use crate::condition::{ConditionError, ConditionNode, Criterion};
use crate::domain::bar::sort_by_date;
use crate::domain::Bar;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

/// Outcome of one condition on one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub pass: bool,
    /// Diagnostic reading at the latest bar; NaN when history was too short.
    pub value: f64,
    pub indicator: String,
    pub window: Option<usize>,
}

impl EvaluationResult {
    pub fn new(pass: bool, value: f64, indicator: impl Into<String>, window: Option<usize>) -> Self {
        Self {
            pass,
            value,
            indicator: indicator.into(),
            window,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    benchmarks: BenchmarkTable,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_benchmarks(benchmarks: BenchmarkTable) -> Self {
        Self { benchmarks }
    }

    pub fn benchmarks(&self) -> &BenchmarkTable {
        &self.benchmarks
    }

    /// Resolve and evaluate `node` against `bars`.
    pub fn evaluate(
        &self,
        node: &ConditionNode,
        bars: &[Bar],
    ) -> Result<EvaluationResult, ConditionError> {
        let criterion = node.resolve()?;
        self.evaluate_criterion(&criterion, bars)
    }

    /// Evaluate an already-resolved criterion. Bars may arrive in any order.
    pub fn evaluate_criterion(
        &self,
        criterion: &Criterion,
        bars: &[Bar],
    ) -> Result<EvaluationResult, ConditionError> {
        let bars = chronological(bars);
        let result = dispatch::dispatch(criterion, &bars, &self.benchmarks)?;
        if result.value.is_nan() {
            debug!(
                indicator = %result.indicator,
                bars = bars.len(),
                "insufficient history, condition fails"
            );
        }
        Ok(result)
    }
}

fn chronological(bars: &[Bar]) -> Cow<'_, [Bar]> {
    if bars.windows(2).all(|w| w[0].date <= w[1].date) {
        Cow::Borrowed(bars)
    } else {
        let mut owned = bars.to_vec();
        sort_by_date(&mut owned);
        Cow::Owned(owned)
    }
}
