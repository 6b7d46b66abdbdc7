//! Horizons: the three views (daily, x-day, weekly) the dashboard reports.
//!
//! Each horizon is the same transform/baseline/signal pipeline run with
//! different parameters. What differs is which bar granularity it consumes,
//! the volatility window, and which indices the report reads.

use crate::domain::Granularity;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Horizon {
    Daily,
    MultiDay { window: usize },
    Weekly,
}

/// Offsets from the end of a series that the report reads (1 = last bar).
///
/// The last bar is normally the period still in progress, so the realised
/// volatility comes from the one before it, while the running high/low of the
/// current period is shown for context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportIndexing {
    pub volatility: usize,
    pub baseline: usize,
    pub extremes: usize,
}

impl Horizon {
    pub fn granularity(&self) -> Granularity {
        match self {
            Horizon::Daily | Horizon::MultiDay { .. } => Granularity::Daily,
            Horizon::Weekly => Granularity::Weekly,
        }
    }

    pub fn window(&self) -> usize {
        match self {
            Horizon::Daily | Horizon::Weekly => 1,
            Horizon::MultiDay { window } => *window,
        }
    }

    /// Which indices the report reads for this horizon.
    ///
    /// Daily and weekly read volatility and baseline from the last closed
    /// period. The x-day view reads its baseline from the last bar instead.
    /// That asymmetry is kept as observed; it may be an upstream slip, but the
    /// figures users compare against were produced this way.
    pub fn indexing(&self) -> ReportIndexing {
        match self {
            Horizon::Daily | Horizon::Weekly => ReportIndexing {
                volatility: 2,
                baseline: 2,
                extremes: 1,
            },
            Horizon::MultiDay { .. } => ReportIndexing {
                volatility: 2,
                baseline: 1,
                extremes: 1,
            },
        }
    }

    /// Stable key used for file names and JSON.
    pub fn key(&self) -> String {
        match self {
            Horizon::Daily => "daily".to_string(),
            Horizon::MultiDay { window } => format!("{window}_day"),
            Horizon::Weekly => "weekly".to_string(),
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Horizon::Daily => f.write_str("daily"),
            Horizon::MultiDay { window } => write!(f, "{window}-day"),
            Horizon::Weekly => f.write_str("weekly"),
        }
    }
}
