//! volboard CLI: volatility report, export, and quote commands.
//!
//! Commands:
//! - `report`: daily / x-day / weekly volatility figures and signals
//! - `export`: annotated CSV (and optionally Parquet / JSON) per horizon
//! - `quote`: latest traded price for a symbol

mod labels;
mod render;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use volboard_core::data::{
    BarRepository, CachedRepository, CircuitBreaker, SyntheticProvider, YahooProvider,
};
use volboard_runner::{
    alert_pct_to_fraction, export_json, run_dashboard, save_run, ConfigOverrides,
    DashboardConfig, ExportOptions,
};

use crate::labels::{label, Label, Locale};

#[derive(Parser)]
#[command(
    name = "volboard",
    version,
    about = "volboard: rolling volatility dashboard and signals"
)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Display language.
    #[arg(long, value_enum, default_value_t = Locale::En, global = true)]
    locale: Locale,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the volatility report for all three horizons.
    Report {
        #[command(flatten)]
        dashboard: DashboardArgs,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Write annotated bar tables for all three horizons.
    Export {
        #[command(flatten)]
        dashboard: DashboardArgs,

        /// Output directory.
        #[arg(long, default_value = "exports")]
        out: PathBuf,

        /// Also write Parquet tables.
        #[arg(long, default_value_t = false)]
        parquet: bool,

        /// Also write the JSON report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the latest traded price.
    Quote {
        /// Ticker symbol.
        #[arg(long, default_value = "AAPL")]
        symbol: String,

        /// Use deterministic synthetic data instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args)]
struct DashboardArgs {
    /// TOML config file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticker symbol (e.g., AAPL, 0700.HK).
    #[arg(long)]
    symbol: Option<String>,

    /// Rolling period for the baseline.
    #[arg(long)]
    period: Option<usize>,

    /// Window of the x-day horizon.
    #[arg(long)]
    window: Option<usize>,

    /// Neutral band as a fraction (0.05 = 5%).
    #[arg(long, conflicts_with = "alert_pct")]
    tolerance: Option<f64>,

    /// Neutral band as a whole-number percentage (5 = 5%).
    #[arg(long)]
    alert_pct: Option<u32>,

    /// Bar cache lifetime in seconds. 0 disables caching.
    #[arg(long)]
    cache_ttl: Option<u64>,

    /// Treat this date as today (YYYY-MM-DD). Defaults to the local date.
    #[arg(long)]
    date: Option<String>,

    /// Use deterministic synthetic data instead of Yahoo Finance.
    #[arg(long, default_value_t = false)]
    synthetic: bool,
}

impl DashboardArgs {
    fn config(&self) -> Result<DashboardConfig> {
        let base = match &self.config {
            Some(path) => DashboardConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => DashboardConfig::default(),
        };
        let config = base.with_overrides(ConfigOverrides {
            symbol: self.symbol.clone(),
            rolling_period: self.period,
            horizon_window: self.window,
            tolerance_pct: self.tolerance.or(self.alert_pct.map(alert_pct_to_fraction)),
            cache_ttl_secs: self.cache_ttl,
        });
        config.validate()?;
        Ok(config)
    }

    fn today(&self) -> Result<NaiveDate> {
        parse_date(self.date.as_deref())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Report { dashboard, format } => run_report(&dashboard, format, cli.locale),
        Commands::Export {
            dashboard,
            out,
            parquet,
            json,
        } => {
            let options = ExportOptions {
                parquet,
                json_report: json,
            };
            run_export(&dashboard, out, options, cli.locale)
        }
        Commands::Quote { symbol, synthetic } => run_quote(&symbol, synthetic, cli.locale),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_date(date: Option<&str>) -> Result<NaiveDate> {
    Ok(date
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("dates must be YYYY-MM-DD")?
        .unwrap_or_else(|| chrono::Local::now().date_naive()))
}

/// Yahoo Finance or synthetic bars, behind a cache when `ttl` is non-zero.
fn build_repository(
    synthetic: bool,
    today: NaiveDate,
    ttl: Duration,
) -> Result<Box<dyn BarRepository>> {
    if synthetic {
        return Ok(with_cache(SyntheticProvider::new(today), ttl));
    }
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = YahooProvider::new(circuit_breaker)?;
    Ok(with_cache(provider, ttl))
}

fn with_cache<R: BarRepository + 'static>(repo: R, ttl: Duration) -> Box<dyn BarRepository> {
    tracing::debug!(repository = repo.name(), ttl_secs = ttl.as_secs(), "using bar repository");
    if ttl.is_zero() {
        Box::new(repo)
    } else {
        Box::new(CachedRepository::new(repo, ttl))
    }
}

fn run_report(args: &DashboardArgs, format: OutputFormat, locale: Locale) -> Result<()> {
    let config = args.config()?;
    let today = args.today()?;
    let repo = build_repository(args.synthetic, today, config.cache_ttl())?;

    let run = run_dashboard(repo.as_ref(), &config, today)
        .with_context(|| format!("building report for {}", config.symbol))?;

    match format {
        OutputFormat::Text => print!("{}", render::render_report(&run.report, locale)),
        OutputFormat::Json => println!("{}", export_json(&run.report)?),
    }
    Ok(())
}

fn run_export(
    args: &DashboardArgs,
    out: PathBuf,
    options: ExportOptions,
    locale: Locale,
) -> Result<()> {
    let config = args.config()?;
    let today = args.today()?;
    let repo = build_repository(args.synthetic, today, config.cache_ttl())?;

    let run = run_dashboard(repo.as_ref(), &config, today)
        .with_context(|| format!("building report for {}", config.symbol))?;
    let paths = save_run(&out, &run, options)?;

    println!("{}:", label(locale, Label::DownloadCsv));
    for path in paths
        .csv
        .iter()
        .chain(&paths.parquet)
        .chain(paths.report_json.as_ref())
    {
        println!("  {}", path.display());
    }
    Ok(())
}

fn run_quote(symbol: &str, synthetic: bool, locale: Locale) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let repo = build_repository(synthetic, today, Duration::ZERO)?;
    let symbol = symbol.trim().to_uppercase();

    let quote = repo
        .fetch_latest_quote(&symbol)
        .with_context(|| format!("fetching latest quote for {symbol}"))?;
    println!("{}: {:.2}", label(locale, Label::Price), quote.price);
    println!(
        "{}: {}",
        label(locale, Label::LastUpdate),
        quote.as_of.format("%Y-%m-%d %H:%M")
    );
    if synthetic {
        println!("({})", label(locale, Label::SyntheticData));
    }
    Ok(())
}
