//! Volatility analytics engine.
//!
//! Pure pipeline per horizon:
//! bars → volatility transform → rolling baseline → signal → report.
//! Nothing here performs I/O or keeps state between runs.

pub mod baseline;
pub mod error;
pub mod horizon;
pub mod report;
pub mod signal;
pub mod transform;

pub use baseline::{baseline, BaselinePoint, RollingBaseline};
pub use error::EngineError;
pub use horizon::{Horizon, ReportIndexing};
pub use report::{assemble, CurrentExtremes, HorizonReport};
pub use signal::{bands, evaluate, Signal, SignalBand, K_LEVELS};
pub use transform::{transform, VolatilityPoint, VolatilitySeries};

use crate::domain::BarSeries;

/// Everything one horizon run produced: the source bars, both derived series, and the report.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonAnalysis {
    pub bars: BarSeries,
    pub volatility: VolatilitySeries,
    pub baseline: RollingBaseline,
    pub report: HorizonReport,
}

/// Run the full engine for one horizon.
///
/// # Errors
/// `InvalidConfiguration` when `bars` is not at the horizon's granularity or
/// when window/period are out of range; `NoData` for an empty series.
pub fn analyze(
    bars: &BarSeries,
    horizon: Horizon,
    period: usize,
    tolerance_pct: f64,
) -> Result<HorizonAnalysis, EngineError> {
    if bars.granularity() != horizon.granularity() {
        return Err(EngineError::invalid_config(format!(
            "{horizon} horizon needs {} bars, got {}",
            horizon.granularity(),
            bars.granularity()
        )));
    }

    let volatility = transform(bars, horizon.window())?;
    let baseline = baseline(&volatility, period)?;
    let report = assemble(horizon, &volatility, &baseline, tolerance_pct)?;

    Ok(HorizonAnalysis {
        bars: bars.clone(),
        volatility,
        baseline,
        report,
    })
}
