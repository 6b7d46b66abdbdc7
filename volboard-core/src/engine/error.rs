//! Engine error types.

use crate::domain::Granularity;
use thiserror::Error;

/// Fatal errors for one analysis run.
///
/// Warm-up (not enough history for a rolling window) is deliberately absent:
/// it flows through the series as `None` and resolves to a `Neutral` signal.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Non-positive window or period, or parameters that do not fit the input.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Empty bar series handed to the engine.
    #[error("no {granularity} bars for '{symbol}'")]
    NoData {
        symbol: String,
        granularity: Granularity,
    },

    /// Derived series that should be index-aligned are not.
    #[error("misaligned series: {0}")]
    Misaligned(String),
}

impl EngineError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration(msg.into())
    }

    /// True for errors caused by the caller's parameters rather than the data.
    pub fn is_configuration(&self) -> bool {
        matches!(self, EngineError::InvalidConfiguration(_))
    }
}
