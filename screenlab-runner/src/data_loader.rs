//! Bar loading for the screening driver.
//!
//! Two sources:
//! 1. A CSV bar table with columns `symbol,date,open,high,low,close,volume`
//!    (ISO dates, any row order, any number of symbols)
//! 2. Synthetic random-walk bars seeded from the symbol name, for offline
//!    demos and tests
//!
//! Void rows (any NaN or missing price) are dropped with a warning rather
//! than failing the whole load. Rows with inconsistent OHLC (high below
//! close, non-positive prices) are kept and counted in a warning.

use chrono::{Datelike, NaiveDate};
use screenlab_core::domain::Bar;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open bar file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid date '{value}' on line {line} (expected YYYY-MM-DD)")]
    InvalidDate { line: u64, value: String },

    #[error("no usable bars in input")]
    Empty,
}

/// One CSV row before validation. Prices are optional so blank cells become
/// void bars instead of decode errors.
#[derive(Debug, Deserialize)]
struct RawRow {
    symbol: String,
    date: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

/// Load a bar table from a CSV file.
pub fn load_csv(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bars = read_csv(file)?;
    debug!(path = %path.display(), bars = bars.len(), "loaded bar table");
    Ok(bars)
}

/// Read a bar table from any CSV source. Header names are matched
/// case-insensitively; cells are trimmed.
pub fn read_csv(reader: impl Read) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let headers: csv::StringRecord = headers.iter().map(|h| h.to_ascii_lowercase()).collect();

    let mut bars = Vec::new();
    let mut dropped = 0usize;
    let mut insane = 0usize;

    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: RawRow = record.deserialize(Some(&headers))?;

        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|_| {
            LoadError::InvalidDate {
                line,
                value: row.date.clone(),
            }
        })?;

        let bar = Bar {
            symbol: row.symbol,
            date,
            open: row.open.unwrap_or(f64::NAN),
            high: row.high.unwrap_or(f64::NAN),
            low: row.low.unwrap_or(f64::NAN),
            close: row.close.unwrap_or(f64::NAN),
            volume: row.volume.unwrap_or(0.0),
        };

        if bar.is_void() {
            warn!(symbol = %bar.symbol, date = %bar.date, line, "dropping void bar");
            dropped += 1;
            continue;
        }
        if !bar.is_sane() {
            debug!(symbol = %bar.symbol, date = %bar.date, line, "inconsistent OHLC");
            insane += 1;
        }
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(LoadError::Empty);
    }
    if dropped > 0 {
        warn!(dropped, kept = bars.len(), "void bars dropped from input");
    }
    if insane > 0 {
        warn!(insane, "bars with inconsistent OHLC kept as-is");
    }
    Ok(bars)
}

/// Synthetic bars for every symbol in `symbols`, concatenated.
pub fn synthetic_universe(symbols: &[&str], start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    symbols
        .iter()
        .flat_map(|s| generate_synthetic_bars(s, start, end))
        .collect()
}

/// Generate synthetic bars for testing/development.
///
/// Produces a simple random walk from a starting price of 100.0 on
/// weekdays between `start` and `end` inclusive. The same symbol always
/// yields the same series.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Deterministic seed from symbol name
    let seed_bytes = blake3::hash(symbol.as_bytes());
    let seed: [u8; 32] = *seed_bytes.as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        // Skip weekends (simple heuristic)
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        bars.push(Bar {
            symbol: symbol.to_string(),
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const SAMPLE: &str = "\
symbol,date,open,high,low,close,volume
AAA,2024-01-02,10.0,10.5,9.8,10.2,1000
BBB,2024-01-02,20.0,20.4,19.9,20.1,2500
AAA,2024-01-03,10.2,10.9,10.1,10.8,1200
";

    #[test]
    fn reads_mixed_symbol_table() {
        let bars = read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].symbol, "AAA");
        assert_eq!(bars[0].date, date(2024, 1, 2));
        assert_eq!(bars[1].volume, 2500.0);
        assert_eq!(bars[2].close, 10.8);
    }

    #[test]
    fn header_case_and_whitespace_are_ignored() {
        let csv = "Symbol, Date ,Open,High,Low,Close,Volume\n AAA , 2024-01-02 ,1,2,0.5,1.5,10\n";
        let bars = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(bars[0].symbol, "AAA");
        assert_eq!(bars[0].high, 2.0);
    }

    #[test]
    fn void_rows_are_dropped() {
        let csv = "\
symbol,date,open,high,low,close,volume
AAA,2024-01-02,10,11,9,10.5,100
AAA,2024-01-03,NaN,11,9,10.5,100
AAA,2024-01-04,10,11,9,,100
AAA,2024-01-05,10,11,9,10.7,
";
        let bars = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].date, date(2024, 1, 5));
        assert_eq!(bars[1].volume, 0.0);
    }

    #[test]
    fn inconsistent_ohlc_rows_are_kept() {
        let csv = "\
symbol,date,open,high,low,close,volume
AAA,2024-01-02,10,9,11,10.5,100
AAA,2024-01-03,10,11,9,10.5,100
";
        let bars = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 2);
        assert!(!bars[0].is_sane());
        assert!(bars[1].is_sane());
    }

    #[test]
    fn invalid_date_names_the_line() {
        let csv = "symbol,date,open,high,low,close,volume\nAAA,01/02/2024,1,1,1,1,1\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        match err {
            LoadError::InvalidDate { line, value } => {
                assert_eq!(line, 2);
                assert_eq!(value, "01/02/2024");
            }
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_price_is_csv_error() {
        let csv = "symbol,date,open,high,low,close,volume\nAAA,2024-01-02,abc,1,1,1,1\n";
        assert!(matches!(read_csv(csv.as_bytes()), Err(LoadError::Csv(_))));
    }

    #[test]
    fn header_only_is_empty() {
        let csv = "symbol,date,open,high,low,close,volume\n";
        assert!(matches!(read_csv(csv.as_bytes()), Err(LoadError::Empty)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_csv(Path::new("/nonexistent/bars.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn synthetic_bars_are_deterministic() {
        let a = generate_synthetic_bars("SPY", date(2024, 1, 1), date(2024, 3, 31));
        let b = generate_synthetic_bars("SPY", date(2024, 1, 1), date(2024, 3, 31));
        assert_eq!(a, b);
        let c = generate_synthetic_bars("QQQ", date(2024, 1, 1), date(2024, 3, 31));
        assert_ne!(a[10].close, c[10].close);
    }

    #[test]
    fn synthetic_bars_skip_weekends_and_are_sane() {
        let bars = generate_synthetic_bars("SPY", date(2024, 1, 1), date(2024, 1, 14));
        // Jan 1-5 and Jan 8-12 2024 are weekdays
        assert_eq!(bars.len(), 10);
        for bar in &bars {
            assert!(bar.date.weekday().num_days_from_monday() < 5);
            assert!(bar.is_sane(), "insane bar {bar:?}");
        }
    }

    #[test]
    fn synthetic_universe_concatenates_symbols() {
        let bars = synthetic_universe(&["AAA", "BBB"], date(2024, 1, 1), date(2024, 1, 5));
        assert_eq!(bars.len(), 10);
        assert!(bars[..5].iter().all(|b| b.symbol == "AAA"));
        assert!(bars[5..].iter().all(|b| b.symbol == "BBB"));
    }
}
