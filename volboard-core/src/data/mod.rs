//! Bar repositories: the provider contract, Yahoo Finance, synthetic data, and caching

pub mod cache;
pub mod circuit_breaker;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use cache::{CacheStats, CachedRepository};
pub use circuit_breaker::CircuitBreaker;
pub use provider::{aggregate_weekly, BarRepository, DataError};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
