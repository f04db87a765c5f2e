//! Screen report types.
//!
//! A report row is the latest bar of a passing symbol, annotated with the
//! diagnostic reading that decided it.

use chrono::NaiveDate;
use screenlab_core::condition::CompiledQuery;
use screenlab_core::domain::{Bar, ScreenId};
use screenlab_core::eval::EvaluationResult;
use serde::{Deserialize, Serialize};

/// One passing symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Diagnostic reading; `None` when the reported leg had no finite value,
    /// as when an OR passes on a later leg while the first lacks history.
    pub indicator_value: Option<f64>,
    pub indicator_name: String,
    pub window: Option<usize>,
}

impl ReportRow {
    pub fn new(latest: &Bar, result: &EvaluationResult) -> Self {
        Self {
            symbol: latest.symbol.clone(),
            date: latest.date,
            open: latest.open,
            high: latest.high,
            low: latest.low,
            close: latest.close,
            volume: latest.volume,
            indicator_value: Some(result.value).filter(|v| v.is_finite()),
            indicator_name: result.indicator.clone(),
            window: result.window,
        }
    }
}

/// Output of one screen: the compiled query, what it ran over, and the
/// passing rows in ascending symbol order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenReport {
    pub screen_id: ScreenId,
    pub query: CompiledQuery,
    pub symbols_scanned: usize,
    pub rows: Vec<ReportRow>,
}

impl ScreenReport {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Passing symbols, in report order.
    pub fn symbols(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.symbol.as_str()).collect()
    }

    pub fn row(&self, symbol: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.symbol == symbol)
    }
}
