//! Report assembler: the presentation-ready figures for one horizon.

use super::baseline::RollingBaseline;
use super::error::EngineError;
use super::horizon::Horizon;
use super::signal::{bands, evaluate, Signal, SignalBand};
use super::transform::VolatilitySeries;
use crate::domain::Granularity;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// High/low of the most recent (possibly in-progress) period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentExtremes {
    pub timestamp: NaiveDateTime,
    pub high: f64,
    pub low: f64,
    pub range: f64,
}

/// Latest figures for one horizon.
///
/// Every `Option` is `None` when the underlying window is still warming up
/// or the series is too short to have a closed period. A report never
/// substitutes zeros for missing figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonReport {
    pub horizon: Horizon,
    pub symbol: String,
    pub granularity: Granularity,
    pub period: usize,
    pub tolerance_pct: f64,
    /// Timestamp of the last closed period.
    pub as_of: Option<NaiveDateTime>,
    pub current: Option<CurrentExtremes>,
    pub last_volatility: Option<f64>,
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
    pub bands: Option<[SignalBand; 3]>,
    pub signal: Signal,
}

impl HorizonReport {
    /// True when the baseline had enough history to produce bands.
    pub fn is_warm(&self) -> bool {
        self.bands.is_some()
    }
}

/// Pick the figures for `horizon` out of its volatility and baseline series.
///
/// # Errors
/// `NoData` for an empty series, `Misaligned` when the two series differ in length.
pub fn assemble(
    horizon: Horizon,
    vol: &VolatilitySeries,
    baseline: &RollingBaseline,
    tolerance_pct: f64,
) -> Result<HorizonReport, EngineError> {
    if vol.is_empty() {
        return Err(EngineError::NoData {
            symbol: vol.symbol().to_string(),
            granularity: vol.granularity(),
        });
    }
    if vol.len() != baseline.len() {
        return Err(EngineError::Misaligned(format!(
            "volatility has {} points, baseline has {}",
            vol.len(),
            baseline.len()
        )));
    }

    let n = vol.len();
    let idx = horizon.indexing();
    let closed = n.checked_sub(idx.volatility).and_then(|i| vol.get(i));
    let base = n.checked_sub(idx.baseline).and_then(|i| baseline.get(i));
    let latest = n.checked_sub(idx.extremes).and_then(|i| vol.get(i));

    let last_volatility = closed.and_then(|p| p.range);
    let mean = base.and_then(|b| b.mean);
    let stddev = base.and_then(|b| b.stddev);

    let current = latest.and_then(|p| {
        let (high, low) = p.high.zip(p.low)?;
        Some(CurrentExtremes {
            timestamp: p.timestamp,
            high,
            low,
            range: high - low,
        })
    });

    let signal = evaluate(last_volatility, mean, tolerance_pct);
    tracing::debug!(
        horizon = %horizon,
        symbol = vol.symbol(),
        ?last_volatility,
        ?mean,
        %signal,
        "assembled horizon report"
    );

    Ok(HorizonReport {
        horizon,
        symbol: vol.symbol().to_string(),
        granularity: vol.granularity(),
        period: baseline.period(),
        tolerance_pct,
        as_of: closed.map(|p| p.timestamp),
        current,
        last_volatility,
        mean,
        stddev,
        bands: mean.zip(stddev).map(|(m, s)| bands(m, s)),
        signal,
    })
}
