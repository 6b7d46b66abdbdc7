//! volboard runner: configuration, the three-horizon dashboard pipeline, and export.
//!
//! This crate builds on `volboard-core` to provide:
//! - `DashboardConfig` with TOML loading, overrides, validation and fingerprinting
//! - `run_dashboard()`: fetch daily and weekly bars, run daily / x-day / weekly horizons
//! - Annotated CSV and Parquet tables, JSON report round-trip

pub mod config;
pub mod export;
pub mod pipeline;

pub use config::{alert_pct_to_fraction, ConfigError, ConfigOverrides, DashboardConfig};
pub use export::{
    annotated_rows, export_annotated_csv, export_json, import_json, save_run,
    write_annotated_parquet, AnnotatedRow, ExportOptions, ExportPaths,
};
pub use pipeline::{
    run_dashboard, DashboardReport, DashboardRun, FetchWindows, PipelineError, SCHEMA_VERSION,
};
