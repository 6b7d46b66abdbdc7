//! Latest traded price for a symbol. Display only; never feeds the volatility engine.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub as_of: NaiveDateTime,
}
