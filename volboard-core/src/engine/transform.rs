//! Volatility transform: per-bar range and x-period trailing-extreme range.
//!
//! - window = 1: range[i] = high[i] - low[i]
//! - window = x: range[i] = max(high[i-x+1..=i]) - min(low[i-x+1..=i])
//!
//! The trailing window is right-aligned and inclusive. Positions with fewer
//! than `window` bars of history are `None`. Lookback: window - 1.

use super::error::EngineError;
use crate::domain::{Bar, BarSeries, Granularity};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One point of a volatility series.
///
/// `high`/`low` are the extremes the range was measured over: the bar's own
/// high/low for window 1, the trailing extremes otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityPoint {
    pub timestamp: NaiveDateTime,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub range: Option<f64>,
}

/// Volatility series aligned 1:1 with its source bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilitySeries {
    symbol: String,
    granularity: Granularity,
    window: usize,
    points: Vec<VolatilityPoint>,
}

impl VolatilitySeries {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn points(&self) -> &[VolatilityPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VolatilityPoint> {
        self.points.get(index)
    }

    pub fn ranges(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.range).collect()
    }
}

/// Trailing maximum of `high` over `window` bars. `None` during warm-up.
pub fn rolling_high(bars: &[Bar], window: usize) -> Vec<Option<f64>> {
    rolling_extreme(bars, window, |b| b.high, f64::max)
}

/// Trailing minimum of `low` over `window` bars. `None` during warm-up.
pub fn rolling_low(bars: &[Bar], window: usize) -> Vec<Option<f64>> {
    rolling_extreme(bars, window, |b| b.low, f64::min)
}

fn rolling_extreme(
    bars: &[Bar],
    window: usize,
    field: impl Fn(&Bar) -> f64,
    pick: impl Fn(f64, f64) -> f64,
) -> Vec<Option<f64>> {
    let n = bars.len();
    let mut result = vec![None; n];
    if window == 0 || n < window {
        return result;
    }

    for i in (window - 1)..n {
        let start = i + 1 - window;
        let extreme = bars[start..=i]
            .iter()
            .map(&field)
            .reduce(&pick);
        result[i] = extreme;
    }

    result
}

/// Derive the volatility series of `bars` over a trailing `window`.
///
/// # Errors
/// `InvalidConfiguration` when `window == 0`; `NoData` when `bars` is empty.
pub fn transform(bars: &BarSeries, window: usize) -> Result<VolatilitySeries, EngineError> {
    if window == 0 {
        return Err(EngineError::invalid_config(
            "volatility window must be a positive integer",
        ));
    }
    if bars.is_empty() {
        return Err(EngineError::NoData {
            symbol: bars.symbol().to_string(),
            granularity: bars.granularity(),
        });
    }

    let points = if window == 1 {
        bars.bars()
            .iter()
            .map(|b| VolatilityPoint {
                timestamp: b.timestamp,
                high: Some(b.high),
                low: Some(b.low),
                range: Some(b.range()),
            })
            .collect()
    } else {
        let highs = rolling_high(bars.bars(), window);
        let lows = rolling_low(bars.bars(), window);
        bars.bars()
            .iter()
            .zip(highs.into_iter().zip(lows))
            .map(|(b, (high, low))| VolatilityPoint {
                timestamp: b.timestamp,
                high,
                low,
                range: high.zip(low).map(|(h, l)| h - l),
            })
            .collect()
    };

    Ok(VolatilitySeries {
        symbol: bars.symbol().to_string(),
        granularity: bars.granularity(),
        window,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_hl_bars(data: &[(f64, f64)]) -> BarSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let bars = data
            .iter()
            .enumerate()
            .map(|(i, &(high, low))| Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open: low,
                high,
                low,
                close: high,
                volume: None,
            })
            .collect();
        BarSeries::new("TEST", Granularity::Daily, bars).unwrap()
    }

    #[test]
    fn single_period_range_is_high_minus_low() {
        let bars = make_hl_bars(&[(10.0, 8.0), (12.0, 9.0), (11.0, 7.0)]);
        let vol = transform(&bars, 1).unwrap();
        assert_eq!(vol.ranges(), vec![Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(vol.get(1).unwrap().high, Some(12.0));
    }

    #[test]
    fn multi_period_uses_trailing_extremes() {
        let bars = make_hl_bars(&[
            (12.0, 9.0),
            (15.0, 10.0),
            (14.0, 13.0),
            (16.0, 12.0),
            (15.5, 14.0),
        ]);
        let vol = transform(&bars, 3).unwrap();
        let ranges = vol.ranges();
        assert_eq!(ranges[0], None);
        assert_eq!(ranges[1], None);
        // [2] = max(12,15,14) - min(9,10,13) = 15 - 9
        assert_eq!(ranges[2], Some(6.0));
        // [3] = 16 - 10
        assert_eq!(ranges[3], Some(6.0));
        // [4] = 16 - 12
        assert_eq!(ranges[4], Some(4.0));
        assert_eq!(vol.get(4).unwrap().high, Some(16.0));
        assert_eq!(vol.get(4).unwrap().low, Some(12.0));
    }

    #[test]
    fn window_longer_than_series_is_all_warmup() {
        let bars = make_hl_bars(&[(10.0, 8.0), (12.0, 9.0)]);
        let vol = transform(&bars, 5).unwrap();
        assert_eq!(vol.len(), 2);
        assert!(vol.ranges().iter().all(Option::is_none));
    }

    #[test]
    fn zero_window_is_invalid_configuration() {
        let bars = make_hl_bars(&[(10.0, 8.0)]);
        let err = transform(&bars, 0).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn empty_series_is_no_data() {
        let bars = BarSeries::new("TEST", Granularity::Weekly, Vec::new()).unwrap();
        let err = transform(&bars, 1).unwrap_err();
        assert!(matches!(
            err,
            EngineError::NoData {
                granularity: Granularity::Weekly,
                ..
            }
        ));
    }

    #[test]
    fn rolling_extremes_on_raw_bars() {
        let bars = make_hl_bars(&[(3.0, 1.0), (5.0, 2.0), (4.0, 0.5)]);
        assert_eq!(
            rolling_high(bars.bars(), 2),
            vec![None, Some(5.0), Some(5.0)]
        );
        assert_eq!(rolling_low(bars.bars(), 2), vec![None, Some(1.0), Some(0.5)]);
    }
}
