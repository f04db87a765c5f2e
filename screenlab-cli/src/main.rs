//! ScreenLab CLI: compile and screen commands.
//!
//! Commands:
//! - `compile`: turn a natural-language query into its condition JSON
//! - `screen`: compile (or load) a condition and run it over a bar table

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use screenlab_core::compiler::{OpenAiCompatibleClient, QueryCompiler};
use screenlab_core::condition::CompiledQuery;
use screenlab_core::domain::Bar;
use screenlab_runner::{
    export_json, load_csv, render_table, synthetic_universe, write_csv, ScreenConfig,
    ScreeningDriver,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "screenlab",
    about = "ScreenLab CLI: natural-language stock screener"
)]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a query and print the condition as JSON.
    Compile {
        /// Query text (e.g., RSI above 70).
        #[arg(required = true)]
        query: Vec<String>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Screen a bar table with a query or a saved condition.
    Screen {
        /// CSV bar table (symbol,date,open,high,low,close,volume).
        #[arg(long, conflicts_with = "synthetic")]
        data: Option<PathBuf>,

        /// Generate synthetic bars for these symbols instead of loading a file.
        #[arg(long, num_args = 1..)]
        synthetic: Vec<String>,

        /// Start date for synthetic bars (YYYY-MM-DD). Defaults to one year ago.
        #[arg(long)]
        start: Option<String>,

        /// End date for synthetic bars (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Query text.
        #[arg(long, conflicts_with = "condition")]
        query: Option<String>,

        /// JSON condition file, as printed by `compile`.
        #[arg(long)]
        condition: Option<PathBuf>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Evaluate symbols on the current thread only.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Write passing rows to this CSV file.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the full report as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Commands::Compile { query, config } => run_compile(&query.join(" "), config.as_deref()),
        Commands::Screen {
            data,
            synthetic,
            start,
            end,
            query,
            condition,
            config,
            sequential,
            output,
            json,
        } => run_screen(ScreenArgs {
            data,
            synthetic,
            start,
            end,
            query,
            condition,
            config,
            sequential,
            output,
            json,
        }),
    }
}

/// Install the global subscriber. Logs go to stderr so stdout carries only
/// report output.
fn init_logging(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Rule set plus the configured model. A client that cannot be built
/// leaves the compiler on the rule set alone.
fn build_compiler(config: &ScreenConfig) -> QueryCompiler {
    match OpenAiCompatibleClient::new(config.model.clone()) {
        Ok(client) => QueryCompiler::with_model(client),
        Err(e) => {
            warn!(error = %e, "language model unavailable, using rule set only");
            QueryCompiler::new()
        }
    }
}

fn run_compile(text: &str, config_path: Option<&Path>) -> Result<()> {
    let config = ScreenConfig::load(config_path)?;
    let compiled = build_compiler(&config).compile(text);
    let json = serde_json::to_string_pretty(&compiled).context("failed to serialize condition")?;
    println!("{json}");
    Ok(())
}

struct ScreenArgs {
    data: Option<PathBuf>,
    synthetic: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    query: Option<String>,
    condition: Option<PathBuf>,
    config: Option<PathBuf>,
    sequential: bool,
    output: Option<PathBuf>,
    json: bool,
}

fn run_screen(args: ScreenArgs) -> Result<()> {
    let config = ScreenConfig::load(args.config.as_deref())?;

    let bars = load_input(&args)?;

    let query = match (&args.query, &args.condition) {
        (Some(text), None) => build_compiler(&config).compile(text),
        (None, Some(path)) => load_condition(path)?,
        (Some(_), Some(_)) => bail!("--query and --condition are mutually exclusive"),
        (None, None) => bail!("one of --query or --condition is required"),
    };
    if let Some(diagnostic) = &query.diagnostic {
        warn!(%diagnostic, "query could not be compiled, nothing will match");
    }

    let parallel = config.screen.parallel && !args.sequential;
    let driver = ScreeningDriver::from_settings(&config.screen).with_parallelism(parallel);
    let report = driver.screen(&query, &bars)?;

    if args.json {
        println!("{}", export_json(&report)?);
    } else {
        print!("{}", render_table(&report));
    }

    if let Some(path) = &args.output {
        write_csv(&report, path)?;
        info!(path = %path.display(), rows = report.len(), "wrote CSV");
    }

    Ok(())
}

fn load_input(args: &ScreenArgs) -> Result<Vec<Bar>> {
    if let Some(path) = &args.data {
        return Ok(load_csv(path)?);
    }
    if args.synthetic.is_empty() {
        bail!("one of --data or --synthetic is required");
    }

    let end_date = args
        .end
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()?
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let start_date = args
        .start
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()?
        .unwrap_or_else(|| end_date - chrono::Duration::days(365));
    if start_date > end_date {
        bail!("--start {start_date} is after --end {end_date}");
    }

    warn!("using synthetic bars, results are not market data");
    let symbols: Vec<&str> = args.synthetic.iter().map(|s| s.as_str()).collect();
    Ok(synthetic_universe(&symbols, start_date, end_date))
}

fn load_condition(path: &Path) -> Result<CompiledQuery> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read condition file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid condition JSON in {}", path.display()))
}
