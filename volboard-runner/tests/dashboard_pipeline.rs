//! Integration tests for the dashboard pipeline.
//!
//! A scripted in-memory repository stands in for the market-data provider so
//! each test controls exactly which bars and failures the pipeline sees.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use volboard_core::data::provider::non_empty_series;
use volboard_core::data::aggregate_weekly;
use volboard_core::data::{BarRepository, CachedRepository, DataError, SyntheticProvider};
use volboard_core::domain::{Bar, BarSeries, Granularity, Quote};
use volboard_core::engine::{Horizon, Signal};
use volboard_runner::{run_dashboard, DashboardConfig, PipelineError};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
}

/// Weekday bars ending at `today()` whose range is `range_of(i)`.
fn weekday_bars(count: usize, range_of: impl Fn(usize) -> f64) -> Vec<Bar> {
    let mut dates = Vec::new();
    let mut d = today();
    while dates.len() < count {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(d);
        }
        d -= chrono::Duration::days(1);
    }
    dates.reverse();
    dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let mid = 100.0 + (i % 10) as f64;
            let half = range_of(i) / 2.0;
            Bar {
                timestamp: date.and_time(NaiveTime::MIN),
                open: mid,
                high: mid + half,
                low: mid - half,
                close: mid,
                volume: None,
            }
        })
        .collect()
}

struct ScriptedRepository {
    daily: Vec<Bar>,
    weekly: Vec<Bar>,
    quote: Option<Quote>,
    fetches: AtomicUsize,
}

impl ScriptedRepository {
    fn new(daily: Vec<Bar>) -> Self {
        let weekly = aggregate_weekly(&daily);
        Self {
            daily,
            weekly,
            quote: None,
            fetches: AtomicUsize::new(0),
        }
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl BarRepository for ScriptedRepository {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BarSeries, DataError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let source = match granularity {
            Granularity::Daily => &self.daily,
            Granularity::Weekly => &self.weekly,
            Granularity::IntradayMinute => {
                return Err(DataError::Other("no intraday script".into()))
            }
        };
        let full = BarSeries::new(symbol, granularity, source.clone())?;
        non_empty_series(symbol, granularity, full.slice_dates(start, end).bars().to_vec())
    }

    fn fetch_latest_quote(&self, symbol: &str) -> Result<Quote, DataError> {
        self.quote.clone().ok_or_else(|| DataError::NoData {
            symbol: symbol.to_string(),
            granularity: Granularity::IntradayMinute,
        })
    }
}

#[test]
fn spike_on_last_closed_day_sells() {
    // Flat range of 1.0, then 5.0 on the last closed day and 0.5 today.
    let n = 120;
    let bars = weekday_bars(n, |i| match i {
        i if i == n - 2 => 5.0,
        i if i == n - 1 => 0.5,
        _ => 1.0,
    });
    let repo = ScriptedRepository::new(bars);
    let config = DashboardConfig {
        rolling_period: 20,
        ..Default::default()
    };

    let run = run_dashboard(&repo, &config, today()).unwrap();
    let daily = &run.report.daily;

    assert_eq!(daily.horizon, Horizon::Daily);
    assert_eq!(daily.last_volatility, Some(5.0));
    // mean over 19 ones and the spike
    assert!((daily.mean.unwrap() - (19.0 + 5.0) / 20.0).abs() < 1e-12);
    assert_eq!(daily.signal, Signal::Sell);
    assert!((daily.current.unwrap().range - 0.5).abs() < 1e-12);
}

#[test]
fn quiet_last_closed_day_buys_past_tolerance() {
    let n = 120;
    let bars = weekday_bars(n, |i| if i == n - 2 { 0.2 } else { 1.0 });
    let repo = ScriptedRepository::new(bars);
    let config = DashboardConfig {
        rolling_period: 20,
        tolerance_pct: 0.5,
        ..Default::default()
    };

    let run = run_dashboard(&repo, &config, today()).unwrap();
    // mean = (19 + 0.2) / 20 = 0.96 ; 0.2 < 0.96 * 0.5
    assert_eq!(run.report.daily.signal, Signal::Buy);
}

#[test]
fn short_history_reports_warm_up_as_neutral() {
    let repo = ScriptedRepository::new(weekday_bars(10, |_| 1.0));
    let run = run_dashboard(&repo, &DashboardConfig::default(), today()).unwrap();

    for report in run.report.horizons() {
        assert_eq!(report.mean, None, "{}", report.horizon);
        assert_eq!(report.bands, None);
        assert_eq!(report.signal, Signal::Neutral);
    }
    assert_eq!(run.report.daily.last_volatility, Some(1.0));
}

#[test]
fn empty_repository_is_fatal_no_data() {
    let repo = ScriptedRepository::new(Vec::new());
    let err = run_dashboard(&repo, &DashboardConfig::default(), today()).unwrap_err();
    assert!(matches!(err, PipelineError::Data(DataError::NoData { .. })));
    assert!(!err.is_configuration());
}

#[test]
fn invalid_window_is_rejected_without_fetching() {
    let repo = ScriptedRepository::new(weekday_bars(60, |_| 1.0));
    let config = DashboardConfig {
        horizon_window: 0,
        ..Default::default()
    };
    let err = run_dashboard(&repo, &config, today()).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(repo.fetch_count(), 0);
}

#[test]
fn missing_quote_does_not_block_report() {
    let repo = ScriptedRepository::new(weekday_bars(60, |_| 1.0));
    let run = run_dashboard(&repo, &DashboardConfig::default(), today()).unwrap();
    assert_eq!(run.report.quote, None);
}

#[test]
fn quote_is_passed_through_for_display() {
    let mut repo = ScriptedRepository::new(weekday_bars(60, |_| 1.0));
    repo.quote = Some(Quote {
        symbol: "AAPL".into(),
        price: 123.45,
        as_of: today().and_hms_opt(15, 59, 0).unwrap(),
    });
    let run = run_dashboard(&repo, &DashboardConfig::default(), today()).unwrap();
    assert_eq!(run.report.quote.unwrap().price, 123.45);
}

#[test]
fn symbol_is_normalized() {
    let repo = ScriptedRepository::new(weekday_bars(60, |_| 1.0));
    let config = DashboardConfig {
        symbol: " aapl ".into(),
        ..Default::default()
    };
    let run = run_dashboard(&repo, &config, today()).unwrap();
    assert_eq!(run.report.symbol, "AAPL");
    assert_eq!(run.daily.bars.symbol(), "AAPL");
}

#[test]
fn multi_day_horizon_reads_baseline_from_last_bar() {
    let n = 80;
    let bars = weekday_bars(n, |i| if i == n - 1 { 9.0 } else { 1.0 });
    let repo = ScriptedRepository::new(bars);
    let config = DashboardConfig {
        rolling_period: 10,
        horizon_window: 1,
        ..Default::default()
    };
    let run = run_dashboard(&repo, &config, today()).unwrap();

    // Daily baseline ends at the closed day: all ones.
    assert_eq!(run.report.daily.mean, Some(1.0));
    // x-day baseline ends at today's bar and includes the 9.0.
    assert!((run.report.multi_day.mean.unwrap() - 1.8).abs() < 1e-12);
    assert_eq!(run.report.multi_day.signal, Signal::Buy);
}

#[test]
fn repeated_runs_are_identical() {
    let provider = SyntheticProvider::new(today());
    let config = DashboardConfig::default();
    let a = run_dashboard(&provider, &config, today()).unwrap();
    let b = run_dashboard(&provider, &config, today()).unwrap();
    assert_eq!(a.report, b.report);
}

#[test]
fn cached_repository_serves_second_run() {
    let cached = CachedRepository::new(
        ScriptedRepository::new(weekday_bars(60, |_| 1.0)),
        Duration::from_secs(300),
    );
    let config = DashboardConfig::default();

    run_dashboard(&cached, &config, today()).unwrap();
    run_dashboard(&cached, &config, today()).unwrap();

    // daily + weekly on the first run only
    assert_eq!(cached.inner().fetch_count(), 2);
    let stats = cached.stats();
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.hits, 2);
}
