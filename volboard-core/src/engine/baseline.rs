//! Rolling baseline: trailing mean and sample standard deviation of a volatility series.
//!
//! For each index i with a full window of `period` defined values ending at i:
//! - mean[i]   = sum(v) / period
//! - stddev[i] = sqrt(sum((v - mean)^2) / (period - 1))
//!
//! Sample stddev (divide by period - 1), matching the usual rolling-statistics
//! convention. A window that is short or contains an undefined volatility
//! value yields `None` for both figures.

use super::error::EngineError;
use super::transform::VolatilitySeries;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselinePoint {
    pub timestamp: NaiveDateTime,
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
}

/// Baseline series aligned 1:1 with the volatility series it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingBaseline {
    period: usize,
    points: Vec<BaselinePoint>,
}

impl RollingBaseline {
    pub fn period(&self) -> usize {
        self.period
    }

    pub fn points(&self) -> &[BaselinePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BaselinePoint> {
        self.points.get(index)
    }

    /// Index of the first point with a defined mean, if any.
    pub fn first_defined(&self) -> Option<usize> {
        self.points.iter().position(|p| p.mean.is_some())
    }
}

/// Mean and sample stddev of a full window, computed in two passes.
///
/// The second pass sums squared deviations from the mean, which avoids the
/// cancellation a single-pass sum-of-squares suffers on long, large-valued series.
pub fn mean_and_sample_std(window: &[f64]) -> Option<(f64, f64)> {
    let n = window.len();
    if n < 2 {
        return None;
    }
    let mean = window.iter().sum::<f64>() / n as f64;
    let sq_dev: f64 = window
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum();
    Some((mean, (sq_dev / (n - 1) as f64).sqrt()))
}

/// Rolling mean/sample-stddev over an optional-valued series.
pub fn rolling_mean_std(values: &[Option<f64>], period: usize) -> Vec<Option<(f64, f64)>> {
    let n = values.len();
    let mut result = vec![None; n];
    if period < 2 || n < period {
        return result;
    }

    let mut window = Vec::with_capacity(period);
    for i in (period - 1)..n {
        window.clear();
        let start = i + 1 - period;
        let complete = values[start..=i].iter().all(|v| match v {
            Some(x) if x.is_finite() => {
                window.push(*x);
                true
            }
            _ => false,
        });
        if complete {
            result[i] = mean_and_sample_std(&window);
        }
    }

    result
}

/// Build the rolling baseline of `vol` over `period` values.
///
/// # Errors
/// `InvalidConfiguration` when `period <= 1` (sample stddev is undefined for one value).
pub fn baseline(vol: &VolatilitySeries, period: usize) -> Result<RollingBaseline, EngineError> {
    if period <= 1 {
        return Err(EngineError::invalid_config(format!(
            "rolling period must be at least 2, got {period}"
        )));
    }

    let stats = rolling_mean_std(&vol.ranges(), period);
    let points = vol
        .points()
        .iter()
        .zip(stats)
        .map(|(p, s)| BaselinePoint {
            timestamp: p.timestamp,
            mean: s.map(|(m, _)| m),
            stddev: s.map(|(_, sd)| sd),
        })
        .collect();

    Ok(RollingBaseline { period, points })
}
