//! volboard core: bar domain types, bar repositories, and the volatility engine.
//!
//! This crate contains:
//! - Domain types (bars, bar series, granularities, quotes)
//! - The `BarRepository` contract with Yahoo Finance, synthetic, and cached implementations
//! - Volatility transform (per-bar range and x-period trailing-extreme range)
//! - Rolling baseline (trailing mean and sample standard deviation)
//! - Signal evaluator and k-sigma bands
//! - Report assembler for the daily, x-day, and weekly horizons

pub mod data;
pub mod domain;
pub mod engine;
