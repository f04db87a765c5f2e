//! Reporting and export: JSON, CSV, and console table output.
//!
//! - **JSON**: the full report, including the screen id and compiled query
//! - **CSV**: passing rows only, one line per symbol
//! - **Table**: fixed-width rendering for the terminal

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::report::{ReportRow, ScreenReport};

/// CSV header, in column order.
pub const CSV_COLUMNS: [&str; 10] = [
    "symbol",
    "date",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "indicator_value",
    "indicator_name",
    "window",
];

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `ScreenReport` to pretty JSON.
pub fn export_json(report: &ScreenReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ScreenReport to JSON")
}

/// Deserialize a `ScreenReport` from JSON.
pub fn import_json(json: &str) -> Result<ScreenReport> {
    serde_json::from_str(json).context("failed to deserialize ScreenReport from JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export report rows as CSV. A missing value or window is written as an
/// empty cell.
pub fn export_rows_csv(rows: &[ReportRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(CSV_COLUMNS)?;

    for r in rows {
        wtr.write_record([
            &r.symbol,
            &r.date.to_string(),
            &format!("{:.6}", r.open),
            &format!("{:.6}", r.high),
            &format!("{:.6}", r.low),
            &format!("{:.6}", r.close),
            &format!("{:.0}", r.volume),
            &r.indicator_value
                .map(|v| format!("{v:.6}"))
                .unwrap_or_default(),
            &r.indicator_name,
            &r.window.map(|w| w.to_string()).unwrap_or_default(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Console table ──────────────────────────────────────────────────

/// Render a report as a fixed-width table with a one-line summary.
pub fn render_table(report: &ScreenReport) -> String {
    let mut out = String::new();

    if report.is_empty() {
        let _ = writeln!(
            out,
            "No symbols match the screening criteria ({} scanned).",
            report.symbols_scanned
        );
        return out;
    }

    let _ = writeln!(
        out,
        "{:<10} {:<10} {:>12} {:>14} {:>14} {:<22} {:>6}",
        "Symbol", "Date", "Close", "Volume", "Value", "Indicator", "Window"
    );
    let _ = writeln!(out, "{}", "─".repeat(94));
    for r in &report.rows {
        let window = r.window.map(|w| w.to_string()).unwrap_or_else(|| "-".into());
        let value = r
            .indicator_value
            .map(|v| format!("{v:.4}"))
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "{:<10} {:<10} {:>12.2} {:>14.0} {:>14} {:<22} {:>6}",
            r.symbol,
            r.date.to_string(),
            r.close,
            r.volume,
            value,
            r.indicator_name,
            window
        );
    }
    let _ = writeln!(
        out,
        "{} of {} symbols match.",
        report.len(),
        report.symbols_scanned
    );
    out
}

// ─── File output ────────────────────────────────────────────────────

/// Write the report rows as CSV to `path`.
pub fn write_csv(report: &ScreenReport, path: &Path) -> Result<()> {
    let csv = export_rows_csv(&report.rows)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}

/// Write the full report as JSON to `path`.
pub fn write_json(report: &ScreenReport, path: &Path) -> Result<()> {
    let json = export_json(report)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
