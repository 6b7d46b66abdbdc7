//! Dashboard pipeline: fetch the bar series, run the three horizons, package the report.
//!
//! One call to [`run_dashboard`] is one stateless run. The daily and x-day
//! horizons share a single daily series; the weekly horizon gets its own.
//! Fetches and horizon computations run on the rayon pool since none of them
//! share mutable state.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use volboard_core::data::{BarRepository, DataError};
use volboard_core::domain::{BarSeries, Quote};
use volboard_core::engine::{analyze, EngineError, HorizonAnalysis, HorizonReport};

use crate::config::{ConfigError, DashboardConfig};

/// Current schema version for serialized dashboard reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from a dashboard run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

impl PipelineError {
    /// True for errors the user fixes by changing parameters, not by retrying.
    pub fn is_configuration(&self) -> bool {
        match self {
            PipelineError::Config(_) => true,
            PipelineError::Engine(e) => e.is_configuration(),
            PipelineError::Data(_) => false,
        }
    }
}

/// Figures for all three horizons of one symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    /// Repository the bars came from ("yahoo", "synthetic", ...).
    pub source: String,
    /// Date the run treated as today.
    pub run_date: NaiveDate,
    /// Latest traded price. Display only; `None` when the quote fetch failed.
    pub quote: Option<Quote>,
    pub daily: HorizonReport,
    pub multi_day: HorizonReport,
    pub weekly: HorizonReport,
    pub config_fingerprint: String,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl DashboardReport {
    pub fn horizons(&self) -> [&HorizonReport; 3] {
        [&self.daily, &self.multi_day, &self.weekly]
    }
}

/// A run's report together with the full analyses it was built from.
///
/// The analyses carry the bars and derived series needed for export.
#[derive(Debug, Clone)]
pub struct DashboardRun {
    pub report: DashboardReport,
    pub daily: HorizonAnalysis,
    pub multi_day: HorizonAnalysis,
    pub weekly: HorizonAnalysis,
}

impl DashboardRun {
    pub fn analyses(&self) -> [&HorizonAnalysis; 3] {
        [&self.daily, &self.multi_day, &self.weekly]
    }
}

/// Fetch date ranges for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindows {
    pub daily: (NaiveDate, NaiveDate),
    pub weekly: (NaiveDate, NaiveDate),
}

impl FetchWindows {
    pub fn for_run(config: &DashboardConfig, today: NaiveDate) -> Self {
        Self {
            daily: (
                today - Duration::days(i64::from(config.daily_lookback_days)),
                today,
            ),
            weekly: (
                today - Duration::days(i64::from(config.weekly_lookback_days)),
                today,
            ),
        }
    }
}

/// Run the dashboard for `config` against `repo`, treating `today` as the run date.
///
/// # Errors
/// Invalid configuration, any bar fetch failure (including `NoData`), or an
/// engine error. A failed quote fetch is logged and leaves `quote` empty.
pub fn run_dashboard(
    repo: &dyn BarRepository,
    config: &DashboardConfig,
    today: NaiveDate,
) -> Result<DashboardRun, PipelineError> {
    config.validate()?;

    let symbol = config.normalized_symbol();
    let windows = FetchWindows::for_run(config, today);
    info!(
        symbol = %symbol,
        repository = repo.name(),
        period = config.rolling_period,
        window = config.horizon_window,
        "starting dashboard run"
    );

    let (daily_bars, weekly_bars) = fetch_series(repo, &symbol, windows)?;
    let [daily_h, multi_h, weekly_h] = config.horizons();
    let period = config.rolling_period;
    let tol = config.tolerance_pct;

    let (daily, (multi_day, weekly)) = rayon::join(
        || analyze(&daily_bars, daily_h, period, tol),
        || {
            rayon::join(
                || analyze(&daily_bars, multi_h, period, tol),
                || analyze(&weekly_bars, weekly_h, period, tol),
            )
        },
    );
    let (daily, multi_day, weekly) = (daily?, multi_day?, weekly?);

    let quote = match repo.fetch_latest_quote(&symbol) {
        Ok(q) => Some(q),
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "latest quote unavailable");
            None
        }
    };

    let report = DashboardReport {
        schema_version: SCHEMA_VERSION,
        symbol: symbol.clone(),
        source: repo.name().to_string(),
        run_date: today,
        quote,
        daily: daily.report.clone(),
        multi_day: multi_day.report.clone(),
        weekly: weekly.report.clone(),
        config_fingerprint: config.fingerprint(),
    };

    info!(
        symbol = %symbol,
        daily = %report.daily.signal,
        multi_day = %report.multi_day.signal,
        weekly = %report.weekly.signal,
        "dashboard run complete"
    );

    Ok(DashboardRun {
        report,
        daily,
        multi_day,
        weekly,
    })
}

fn fetch_series(
    repo: &dyn BarRepository,
    symbol: &str,
    windows: FetchWindows,
) -> Result<(BarSeries, BarSeries), DataError> {
    let (daily, weekly) = rayon::join(
        || repo.fetch_daily(symbol, windows.daily.0, windows.daily.1),
        || repo.fetch_weekly(symbol, windows.weekly.0, windows.weekly.1),
    );
    let (daily, weekly) = (daily?, weekly?);
    info!(
        symbol,
        daily_bars = daily.len(),
        weekly_bars = weekly.len(),
        "fetched bar series"
    );
    Ok((daily, weekly))
}
