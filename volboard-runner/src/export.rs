//! Export: annotated bar tables (CSV, Parquet) and the JSON dashboard report.
//!
//! The annotated table is the source bars plus the derived columns, one row
//! per bar:
//!
//! timestamp, open, high, low, close, [volume], range, rolling_mean, rolling_stddev
//!
//! `volume` is present only when at least one bar carries it. Undefined
//! values (warm-up, missing volume) are empty cells in CSV and nulls in Parquet.
//!
//! Persisted JSON reports include a `schema_version` field. Newer versions
//! are rejected on load.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use polars::prelude::{Column, DataFrame, NamedFrom, ParquetWriter, Series};
use tracing::info;

use volboard_core::engine::{Horizon, HorizonAnalysis};

use crate::pipeline::{DashboardReport, DashboardRun, SCHEMA_VERSION};

/// One row of the annotated bar table.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRow {
    pub timestamp: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
    pub range: Option<f64>,
    pub rolling_mean: Option<f64>,
    pub rolling_stddev: Option<f64>,
}

/// Join bars with their volatility and baseline points.
pub fn annotated_rows(analysis: &HorizonAnalysis) -> Vec<AnnotatedRow> {
    let granularity = analysis.bars.granularity();
    analysis
        .bars
        .bars()
        .iter()
        .zip(analysis.volatility.points())
        .zip(analysis.baseline.points())
        .map(|((bar, vol), base)| AnnotatedRow {
            timestamp: granularity.format_timestamp(bar.timestamp),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            range: vol.range,
            rolling_mean: base.mean,
            rolling_stddev: base.stddev,
        })
        .collect()
}

/// File stem for a horizon's exported table, e.g. `5_day_volatility`.
pub fn file_stem(horizon: &Horizon) -> String {
    format!("{}_volatility", horizon.key())
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Export one horizon's annotated bar table as CSV.
pub fn export_annotated_csv(analysis: &HorizonAnalysis) -> Result<String> {
    let with_volume = analysis.bars.has_volume();
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["timestamp", "open", "high", "low", "close"];
    if with_volume {
        header.push("volume");
    }
    header.extend(["range", "rolling_mean", "rolling_stddev"]);
    wtr.write_record(&header)?;

    for row in annotated_rows(analysis) {
        let mut record = vec![
            row.timestamp,
            row.open.to_string(),
            row.high.to_string(),
            row.low.to_string(),
            row.close.to_string(),
        ];
        if with_volume {
            record.push(opt_cell(row.volume));
        }
        record.push(opt_cell(row.range));
        record.push(opt_cell(row.rolling_mean));
        record.push(opt_cell(row.rolling_stddev));
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Parquet export ─────────────────────────────────────────────────

/// Write one horizon's annotated bar table as Parquet.
pub fn write_annotated_parquet(path: &Path, analysis: &HorizonAnalysis) -> Result<()> {
    let rows = annotated_rows(analysis);

    let mut columns = vec![
        Column::Series(Series::new(
            "timestamp".into(),
            rows.iter().map(|r| r.timestamp.clone()).collect::<Vec<_>>(),
        ).into()),
        Column::Series(Series::new(
            "open".into(),
            rows.iter().map(|r| r.open).collect::<Vec<_>>(),
        ).into()),
        Column::Series(Series::new(
            "high".into(),
            rows.iter().map(|r| r.high).collect::<Vec<_>>(),
        ).into()),
        Column::Series(Series::new(
            "low".into(),
            rows.iter().map(|r| r.low).collect::<Vec<_>>(),
        ).into()),
        Column::Series(Series::new(
            "close".into(),
            rows.iter().map(|r| r.close).collect::<Vec<_>>(),
        ).into()),
    ];
    if analysis.bars.has_volume() {
        columns.push(Column::Series(Series::new(
            "volume".into(),
            rows.iter().map(|r| r.volume).collect::<Vec<_>>(),
        ).into()));
    }
    columns.extend([
        Column::Series(Series::new(
            "range".into(),
            rows.iter().map(|r| r.range).collect::<Vec<_>>(),
        ).into()),
        Column::Series(Series::new(
            "rolling_mean".into(),
            rows.iter().map(|r| r.rolling_mean).collect::<Vec<_>>(),
        ).into()),
        Column::Series(Series::new(
            "rolling_stddev".into(),
            rows.iter().map(|r| r.rolling_stddev).collect::<Vec<_>>(),
        ).into()),
    ]);

    let mut df = DataFrame::new(columns).context("Failed to build annotated dataframe")?;
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("Failed to write annotated parquet")?;
    Ok(())
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `DashboardReport` to pretty JSON.
pub fn export_json(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize DashboardReport to JSON")
}

/// Deserialize a `DashboardReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<DashboardReport> {
    let report: DashboardReport =
        serde_json::from_str(json).context("failed to deserialize DashboardReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── Save to directory ──────────────────────────────────────────────

/// Which optional artifacts to write next to the CSV tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub parquet: bool,
    pub json_report: bool,
}

/// Paths of everything a save wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: Vec<PathBuf>,
    pub parquet: Vec<PathBuf>,
    pub report_json: Option<PathBuf>,
}

/// Write a run's tables (and optionally Parquet and the JSON report) into `dir`.
///
/// Produces `daily_volatility.csv`, `{x}_day_volatility.csv`, and
/// `weekly_volatility.csv`. Existing files are overwritten.
pub fn save_run(dir: &Path, run: &DashboardRun, options: ExportOptions) -> Result<ExportPaths> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

    let mut paths = ExportPaths::default();
    for analysis in run.analyses() {
        let stem = file_stem(&analysis.report.horizon);

        let csv_path = dir.join(format!("{stem}.csv"));
        let csv = export_annotated_csv(analysis)?;
        std::fs::write(&csv_path, csv)
            .with_context(|| format!("Failed to write {}", csv_path.display()))?;
        paths.csv.push(csv_path);

        if options.parquet {
            let parquet_path = dir.join(format!("{stem}.parquet"));
            write_annotated_parquet(&parquet_path, analysis)?;
            paths.parquet.push(parquet_path);
        }
    }

    if options.json_report {
        let json_path = dir.join("report.json");
        std::fs::write(&json_path, export_json(&run.report)?)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        paths.report_json = Some(json_path);
    }

    info!(
        dir = %dir.display(),
        files = paths.csv.len() + paths.parquet.len() + usize::from(paths.report_json.is_some()),
        "exported dashboard run"
    );
    Ok(paths)
}
