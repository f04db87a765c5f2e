//! ScreenLab Runner: screening driver, reports, bar loading, configuration.
//!
//! This crate builds on `screenlab-core` to provide:
//! - Bar loading from CSV, with synthetic random-walk bars for offline use
//! - The screening driver (symbol grouping, parallel fan-out, stable order)
//! - Report rows and JSON / CSV / console exports
//! - TOML configuration for the language-model endpoint and the driver

pub mod config;
pub mod data_loader;
pub mod export;
pub mod report;
pub mod screen;

pub use config::{ConfigError, ScreenConfig, ScreenSettings};
pub use data_loader::{generate_synthetic_bars, load_csv, read_csv, synthetic_universe, LoadError};
pub use export::{export_json, export_rows_csv, import_json, render_table, write_csv, write_json};
pub use report::{ReportRow, ScreenReport};
pub use screen::{group_by_symbol, ScreeningDriver};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the driver and everything it hands back can cross
    /// thread boundaries.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<ScreeningDriver>();
        require_sync::<ScreeningDriver>();
        require_send::<ScreenReport>();
        require_sync::<ScreenReport>();
        require_send::<ReportRow>();
        require_sync::<ReportRow>();
        require_send::<ScreenConfig>();
        require_sync::<ScreenConfig>();
        require_send::<LoadError>();
        require_sync::<LoadError>();
    }
}
