//! Signal evaluator and k-sigma bands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading signal derived from last-period volatility against its baseline.
///
/// Volatility above the tolerance band reads as `Sell`, below as `Buy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Sell,
    Buy,
    Neutral,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Sell => "sell",
            Signal::Buy => "buy",
            Signal::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compare the latest volatility against its mean widened by `tolerance_pct`.
///
/// - `Sell` when `volatility > mean * (1 + tolerance_pct)`
/// - `Buy` when `volatility < mean * (1 - tolerance_pct)`
/// - `Neutral` otherwise, and whenever either input is undefined or NaN.
///
/// `tolerance_pct` is a fraction (0.05 = 5%) and is not clamped. At
/// `tolerance_pct >= 1` the Buy threshold is zero or negative, so a
/// non-negative volatility can never produce `Buy`.
pub fn evaluate(
    latest_volatility: Option<f64>,
    latest_mean: Option<f64>,
    tolerance_pct: f64,
) -> Signal {
    let (Some(vol), Some(mean)) = (latest_volatility, latest_mean) else {
        return Signal::Neutral;
    };

    if vol > mean * (1.0 + tolerance_pct) {
        Signal::Sell
    } else if vol < mean * (1.0 - tolerance_pct) {
        Signal::Buy
    } else {
        Signal::Neutral
    }
}

/// The k-sigma levels reported for every horizon.
pub const K_LEVELS: [u8; 3] = [1, 2, 3];

/// `mean ± k·stddev`, with the lower edge floored at zero since a range
/// cannot be negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalBand {
    pub k: u8,
    pub lower: f64,
    pub upper: f64,
}

impl SignalBand {
    pub fn new(k: u8, mean: f64, stddev: f64) -> Self {
        let width = f64::from(k) * stddev;
        Self {
            k,
            lower: (mean - width).max(0.0),
            upper: mean + width,
        }
    }
}

/// The 1σ, 2σ and 3σ bands around `mean`.
pub fn bands(mean: f64, stddev: f64) -> [SignalBand; 3] {
    K_LEVELS.map(|k| SignalBand::new(k, mean, stddev))
}
