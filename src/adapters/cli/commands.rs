//! CLI Command Handlers
//!
//! Implementation of all CLI commands for bollinger-scout.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::chart::FileChartWriter;
use crate::adapters::market_data::{CsvDirectorySource, HttpQuoteSource};
use crate::application::{AnalysisOrchestrator, AnalysisReport};
use crate::config::{load_config, MarketDataSection, QuoteSourceKind};
use crate::domain::{trading_range, Series, DEFAULT_LOOKBACK_MULTIPLIER};
use crate::ports::MarketDataPort;
use crate::strategy::{AnalysisConfig, ScanMode};

/// Bollinger Scout - Bollinger Band trend screening for daily quotes
#[derive(Parser, Debug)]
#[command(
    name = "bollinger-scout",
    version = env!("CARGO_PKG_VERSION"),
    about = "Bollinger Band trend screening for daily quotes",
    long_about = "Bollinger Scout computes Bollinger Bands over recent daily closes for a list \
                  of symbols, classifies each by trend and band position, and recommends the \
                  symbol with the widest bands among those worth investing in."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen the configured symbols and recommend one
    Analyze(AnalyzeCmd),

    /// Print the annotated band series for one symbol
    Bands(BandsCmd),

    /// Print the quote date range for a number of periods
    Range(RangeCmd),
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Screen configured symbols
#[derive(Parser, Debug)]
pub struct AnalyzeCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Analysis date (YYYY-MM-DD), defaults to today
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Evaluate every symbol instead of stopping at the first verdict
    #[arg(long)]
    pub scan_all: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write chart data files to this directory (overrides config)
    #[arg(long, value_name = "DIR")]
    pub chart_dir: Option<PathBuf>,
}

/// Annotated series for one symbol
#[derive(Parser, Debug)]
pub struct BandsCmd {
    /// Symbol to fetch (e.g., AAPL)
    #[arg(value_name = "SYMBOL")]
    pub symbol: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Override window length
    #[arg(long, value_name = "PERIODS")]
    pub periods: Option<usize>,

    /// Override band factor
    #[arg(long, value_name = "FACTOR")]
    pub factor: Option<f64>,

    /// Analysis date (YYYY-MM-DD), defaults to today
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Quote date range
#[derive(Parser, Debug)]
pub struct RangeCmd {
    /// Number of trading periods
    #[arg(value_name = "PERIODS")]
    pub periods: usize,

    /// End date (YYYY-MM-DD), defaults to today
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Window lengths of history to cover
    #[arg(long, value_name = "N", default_value_t = DEFAULT_LOOKBACK_MULTIPLIER)]
    pub multiplier: usize,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    // Initialize logging based on flags
    init_logging(app.verbose, app.debug)?;

    match app.command {
        Command::Analyze(cmd) => analyze_command(cmd).await,
        Command::Bands(cmd) => bands_command(cmd).await,
        Command::Range(cmd) => range_command(cmd),
    }
}

/// Initialize logging system
fn init_logging(verbose: bool, debug: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    Ok(())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Build the quote source named in config
pub fn build_market_data(section: &MarketDataSection) -> Result<Arc<dyn MarketDataPort>> {
    match section.source {
        QuoteSourceKind::CsvDir => {
            let dir = section
                .get_data_dir()
                .context("market_data.data_dir is required for the csv_dir source")?;
            Ok(Arc::new(CsvDirectorySource::new(dir)))
        }
        QuoteSourceKind::Http => {
            let template = section
                .get_url_template()
                .context("market_data.url_template is required for the http source")?;
            let source = HttpQuoteSource::new(template, Duration::from_secs(section.timeout_secs))
                .context("Failed to create HTTP quote client")?;
            Ok(Arc::new(source))
        }
    }
}

/// Handle analyze command
async fn analyze_command(cmd: AnalyzeCmd) -> Result<()> {
    let mut config = load_config(&cmd.config)
        .with_context(|| format!("Failed to load configuration from {}", cmd.config.display()))?;
    if cmd.scan_all {
        config.analysis.scan_mode = ScanMode::ScanAll;
    }

    let market_data = build_market_data(&config.market_data)?;
    let mut orchestrator = AnalysisOrchestrator::from_config(&config, market_data)
        .context("Invalid analysis configuration")?;

    if let Some(dir) = cmd.chart_dir.clone().or_else(|| config.output.get_chart_dir()) {
        let writer = FileChartWriter::new(dir, config.output.chart_format);
        tracing::info!(
            "Chart data will be written to {} as {}",
            writer.dir().display(),
            writer.format().extension()
        );
        orchestrator = orchestrator.with_chart_sink(Box::new(writer));
    }

    let as_of = cmd.as_of.unwrap_or_else(today);
    let report = orchestrator.run(as_of).await.context("Analysis failed")?;

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!(
        "As of {} (quotes {} to {}), mode {:?}",
        report.as_of, report.range.start, report.range.end, report.selection.mode
    );
    println!();
    println!("  {:<10} {:<8} {:<44} {:>10}", "SYMBOL", "VERDICT", "RULE", "BAND WIDTH");
    for e in &report.selection.evaluations {
        let rule = e.rule.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string());
        println!("  {:<10} {:<8} {:<44} {:>10.4}", e.symbol, e.verdict.to_string(), rule, e.band_width);
    }

    if let Some(halted) = &report.selection.halted_at {
        println!();
        println!("  Scan stopped at {}", halted);
    }

    if !report.skipped.is_empty() {
        println!();
        println!("  Skipped:");
        for s in &report.skipped {
            println!("    {} - {}", s.symbol, s.reason);
        }
    }

    if !report.charts.is_empty() {
        println!();
        println!("  Chart data:");
        for path in &report.charts {
            println!("    {}", path.display());
        }
    }

    println!();
    println!("You should invest in: {}", report.selection);
}

/// Handle bands command
async fn bands_command(cmd: BandsCmd) -> Result<()> {
    let config = load_config(&cmd.config)
        .with_context(|| format!("Failed to load configuration from {}", cmd.config.display()))?;

    let mut analysis = AnalysisConfig::from(&config);
    if let Some(periods) = cmd.periods {
        analysis = analysis.with_periods(periods);
    }
    if let Some(factor) = cmd.factor {
        analysis = analysis.with_factor(factor);
    }

    let market_data = build_market_data(&config.market_data)?;
    let orchestrator = AnalysisOrchestrator::new(analysis, vec![cmd.symbol.clone()], market_data)
        .context("Invalid band parameters")?
        .with_lookback_multiplier(config.market_data.lookback_multiplier);

    let as_of = cmd.as_of.unwrap_or_else(today);
    let series = orchestrator
        .fetch_series(&cmd.symbol, as_of)
        .await
        .with_context(|| format!("Failed to compute bands for {}", cmd.symbol))?;

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&series)?),
        OutputFormat::Text => print_series(&series),
    }

    Ok(())
}

fn print_series(series: &Series) {
    println!("{} ({} quotes, {} with bands)", series.symbol(), series.len(), series.computed_len());
    println!();
    println!("  {:<10} {:>12} {:>12} {:>12} {:>12}", "DATE", "CLOSE", "AVERAGE", "UPPER", "LOWER");
    for p in series.points() {
        match p.bands {
            Some(b) => println!(
                "  {:<10} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                p.date, p.close, b.moving_average, b.upper, b.lower
            ),
            None => println!("  {:<10} {:>12.4} {:>12} {:>12} {:>12}", p.date, p.close, "-", "-", "-"),
        }
    }
}

/// Handle range command
fn range_command(cmd: RangeCmd) -> Result<()> {
    let as_of = cmd.as_of.unwrap_or_else(today);
    let range = trading_range(cmd.periods, as_of, cmd.multiplier).context("Invalid range request")?;

    println!("{} to {}", range.start, range.end);
    Ok(())
}
