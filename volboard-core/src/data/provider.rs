//! Bar repository trait and structured error types.
//!
//! The `BarRepository` trait abstracts over data sources (Yahoo Finance,
//! synthetic fixtures, scripted test doubles) so the engine never knows where
//! its bars come from. Caching sits above this trait as a wrapper.

use crate::domain::{Bar, BarError, BarSeries, Granularity, Quote};
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use thiserror::Error;

/// Structured error types for data operations.
///
/// These are designed to be displayable directly by the CLI.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no {granularity} data returned for '{symbol}'")]
    NoData {
        symbol: String,
        granularity: Granularity,
    },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("invalid bar data: {0}")]
    InvalidBar(#[from] BarError),

    #[error("data error: {0}")]
    Other(String),
}

/// Source of ordered price bars and point-in-time quotes for a symbol.
///
/// Every fetch fails with `DataError::NoData` when the source has zero bars
/// for the request. Implementations never substitute placeholder bars.
pub trait BarRepository: Send + Sync {
    /// Human-readable name of this repository.
    fn name(&self) -> &str;

    /// Fetch bars at the given granularity whose dates fall in `[start, end]`.
    fn fetch_bars(
        &self,
        symbol: &str,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BarSeries, DataError>;

    /// Most recent traded price. Used for display only.
    fn fetch_latest_quote(&self, symbol: &str) -> Result<Quote, DataError>;

    fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BarSeries, DataError> {
        self.fetch_bars(symbol, Granularity::Daily, start, end)
    }

    fn fetch_weekly(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BarSeries, DataError> {
        self.fetch_bars(symbol, Granularity::Weekly, start, end)
    }
}

/// Sort bars by timestamp and collapse duplicates, keeping the later row.
///
/// Providers occasionally repeat the in-progress period as a second row with
/// the same timestamp; the later row is the fresher snapshot.
pub fn canonicalize(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.sort_by_key(|b| b.timestamp);
    let mut out: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(prev) if prev.timestamp == bar.timestamp => *prev = bar,
            _ => out.push(bar),
        }
    }
    out
}

/// Merge rows that fall in the same ISO week into one Monday-stamped bar.
///
/// open = first open, close = last close, high/low = extremes of the week,
/// volume = sum when every row carries one. Input must be sorted.
pub fn aggregate_weekly(rows: &[Bar]) -> Vec<Bar> {
    let mut weeks: Vec<Bar> = Vec::new();
    let mut current_week = None;

    for bar in rows {
        let iso = bar.date().iso_week();
        let key = (iso.year(), iso.week());
        if current_week == Some(key) {
            if let Some(week) = weeks.last_mut() {
                week.high = week.high.max(bar.high);
                week.low = week.low.min(bar.low);
                week.close = bar.close;
                week.volume = match (week.volume, bar.volume) {
                    (Some(a), Some(b)) => Some(a + b),
                    _ => None,
                };
            }
            continue;
        }

        current_week = Some(key);
        let monday = NaiveDate::from_isoywd_opt(iso.year(), iso.week(), Weekday::Mon)
            .unwrap_or_else(|| bar.date());
        weeks.push(Bar {
            timestamp: monday.and_time(NaiveTime::MIN),
            ..bar.clone()
        });
    }

    weeks
}

/// Build a validated series, mapping an empty result to `NoData`.
pub fn non_empty_series(
    symbol: &str,
    granularity: Granularity,
    bars: Vec<Bar>,
) -> Result<BarSeries, DataError> {
    if bars.is_empty() {
        return Err(DataError::NoData {
            symbol: symbol.to_string(),
            granularity,
        });
    }
    Ok(BarSeries::new(symbol, granularity, bars)?)
}
