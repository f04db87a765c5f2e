//! Benchmark series for relative-strength conditions.
//!
//! A benchmark is either another loaded symbol, looked up case-insensitively
//! and aligned to the screened symbol by date, or a fixed numeric level.

use crate::condition::ConditionError;
use crate::domain::Bar;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Closes by date, keyed by upper-cased symbol.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkTable {
    series: HashMap<String, BTreeMap<NaiveDate, f64>>,
}

/// A resolved benchmark.
#[derive(Debug, Clone, Copy)]
pub enum Benchmark<'a> {
    Series(&'a BTreeMap<NaiveDate, f64>),
    Level(f64),
}

impl Benchmark<'_> {
    /// Benchmark value on `date`; NaN when the series has no bar that day.
    pub fn at(&self, date: NaiveDate) -> f64 {
        match self {
            Benchmark::Series(s) => s.get(&date).copied().unwrap_or(f64::NAN),
            Benchmark::Level(v) => *v,
        }
    }
}

impl BenchmarkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every symbol in a mixed bar table.
    pub fn from_bars(bars: &[Bar]) -> Self {
        let mut table = Self::new();
        for bar in bars {
            table
                .series
                .entry(bar.symbol.to_ascii_uppercase())
                .or_default()
                .insert(bar.date, bar.close);
        }
        table
    }

    pub fn insert(&mut self, symbol: &str, bars: &[Bar]) {
        let entry = self.series.entry(symbol.to_ascii_uppercase()).or_default();
        for bar in bars {
            entry.insert(bar.date, bar.close);
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.series.contains_key(&symbol.to_ascii_uppercase())
    }

    /// Symbol first, then a numeric level.
    pub fn resolve(&self, id: &str) -> Result<Benchmark<'_>, ConditionError> {
        let key = id.trim().to_ascii_uppercase();
        if let Some(series) = self.series.get(&key) {
            return Ok(Benchmark::Series(series));
        }
        match id.trim().parse::<f64>() {
            Ok(level) if level.is_finite() => Ok(Benchmark::Level(level)),
            _ => Err(ConditionError::UnknownBenchmark(id.to_string())),
        }
    }
}
