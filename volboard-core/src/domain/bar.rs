//! Bar — the fundamental market data unit, and the ordered series built from it.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// OHLC bar for a single symbol over a single period.
///
/// `volume` is optional because not every source reports it (weekly bars from
/// some feeds, synthetic fixtures). Export omits the column when no bar carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl Bar {
    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// OHLC sanity check: high >= low, high >= open/close, low <= open/close.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }

    /// High minus low for this single bar.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Sampling period of a bar series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Daily,
    Weekly,
    IntradayMinute,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::IntradayMinute => "intraday_minute",
        }
    }

    /// Format a bar timestamp at the resolution this granularity carries.
    ///
    /// Daily and weekly bars print as plain dates; minute bars keep the time.
    pub fn format_timestamp(&self, ts: NaiveDateTime) -> String {
        match self {
            Granularity::Daily | Granularity::Weekly => ts.date().format("%Y-%m-%d").to_string(),
            Granularity::IntradayMinute => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Violations of the bar series invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error(
        "bar {index} at {timestamp} violates OHLC invariants \
         (open={open}, high={high}, low={low}, close={close})"
    )]
    Insane {
        index: usize,
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },

    #[error("bar {index} at {timestamp} is not strictly after its predecessor")]
    OutOfOrder {
        index: usize,
        timestamp: NaiveDateTime,
    },
}

/// Ordered, validated sequence of bars for one symbol at one granularity.
///
/// Construction checks every bar for OHLC sanity and enforces strictly
/// ascending timestamps (no duplicates). Once built the series is immutable.
/// An empty series is representable; the engine rejects it with `NoData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    symbol: String,
    granularity: Granularity,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(
        symbol: impl Into<String>,
        granularity: Granularity,
        bars: Vec<Bar>,
    ) -> Result<Self, BarError> {
        for (index, bar) in bars.iter().enumerate() {
            if !bar.is_sane() {
                return Err(BarError::Insane {
                    index,
                    timestamp: bar.timestamp,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                });
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(BarError::OutOfOrder {
                    index,
                    timestamp: bar.timestamp,
                });
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            granularity,
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// True if at least one bar carries a volume figure.
    pub fn has_volume(&self) -> bool {
        self.bars.iter().any(|b| b.volume.is_some())
    }

    /// Bars whose date falls inside `[start, end]`, as a new series.
    pub fn slice_dates(&self, start: NaiveDate, end: NaiveDate) -> BarSeries {
        BarSeries {
            symbol: self.symbol.clone(),
            granularity: self.granularity,
            bars: self
                .bars
                .iter()
                .filter(|b| b.date() >= start && b.date() <= end)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sample_bar(day: u32) -> Bar {
        Bar {
            timestamp: ts(day),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: Some(50_000),
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar(2).is_sane());
        assert_eq!(sample_bar(2).range(), 7.0);
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar(2);
        bar.open = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar(2);
        bar.high = 97.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn series_rejects_insane_bar() {
        let mut bad = sample_bar(3);
        bad.low = 104.0;
        let err = BarSeries::new("AAPL", Granularity::Daily, vec![sample_bar(2), bad]).unwrap_err();
        assert!(matches!(err, BarError::Insane { index: 1, .. }));
    }

    #[test]
    fn series_rejects_duplicate_timestamp() {
        let err = BarSeries::new("AAPL", Granularity::Daily, vec![sample_bar(2), sample_bar(2)])
            .unwrap_err();
        assert_eq!(
            err,
            BarError::OutOfOrder {
                index: 1,
                timestamp: ts(2)
            }
        );
    }

    #[test]
    fn series_accepts_empty() {
        let series = BarSeries::new("AAPL", Granularity::Weekly, Vec::new()).unwrap();
        assert!(series.is_empty());
        assert!(!series.has_volume());
    }

    #[test]
    fn slice_dates_is_inclusive() {
        let series = BarSeries::new(
            "AAPL",
            Granularity::Daily,
            vec![sample_bar(2), sample_bar(3), sample_bar(4)],
        )
        .unwrap();
        let sliced = series.slice_dates(ts(3).date(), ts(4).date());
        assert_eq!(sliced.len(), 2);
        assert_eq!(sliced.first().unwrap().timestamp, ts(3));
    }

    #[test]
    fn granularity_formats_timestamps() {
        let t = ts(2) + chrono::Duration::minutes(90);
        assert_eq!(Granularity::Daily.format_timestamp(t), "2024-01-02");
        assert_eq!(
            Granularity::IntradayMinute.format_timestamp(t),
            "2024-01-02 01:30:00"
        );
    }
}
