//! Criterion benchmarks for the volatility engine hot paths.
//!
//! Benchmarks:
//! 1. Volatility transform (window 1 and trailing-extreme windows)
//! 2. Rolling baseline (two-pass mean/sample stddev)
//! 3. Full horizon analysis (transform + baseline + report)
//! 4. Weekly aggregation of synthetic daily bars

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use volboard_core::data::aggregate_weekly;
use volboard_core::data::SyntheticProvider;
use volboard_core::domain::{Bar, BarSeries, Granularity};
use volboard_core::engine::{analyze, baseline, transform, Horizon};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> BarSeries {
    let base = NaiveDate::from_ymd_opt(2015, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let bars = (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            let spread = 1.0 + (i as f64 * 0.37).cos().abs();
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open: close - 0.3,
                high: close + spread,
                low: close - 0.3 - spread,
                close,
                volume: Some(1_000_000 + (i as u64 % 500_000)),
            }
        })
        .collect();
    BarSeries::new("BENCH", Granularity::Daily, bars).unwrap()
}

// ── 1. Volatility Transform ──────────────────────────────────────────

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");

    for &bar_count in &[252, 1260, 2520] {
        let bars = make_bars(bar_count);
        for &window in &[1usize, 5, 20] {
            group.bench_with_input(
                BenchmarkId::new(format!("window_{window}"), bar_count),
                &bar_count,
                |b, _| b.iter(|| transform(black_box(&bars), black_box(window))),
            );
        }
    }

    group.finish();
}

// ── 2. Rolling Baseline ──────────────────────────────────────────────

fn bench_baseline(c: &mut Criterion) {
    let mut group = c.benchmark_group("baseline");

    for &bar_count in &[252, 1260, 2520] {
        let vol = transform(&make_bars(bar_count), 1).unwrap();
        for &period in &[20usize, 50, 200] {
            group.bench_with_input(
                BenchmarkId::new(format!("period_{period}"), bar_count),
                &bar_count,
                |b, _| b.iter(|| baseline(black_box(&vol), black_box(period))),
            );
        }
    }

    group.finish();
}

// ── 3. Full Horizon Analysis ─────────────────────────────────────────

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    let bars = make_bars(1260);

    group.bench_function("daily_1260_bars", |b| {
        b.iter(|| analyze(black_box(&bars), Horizon::Daily, 50, 0.0))
    });
    group.bench_function("5_day_1260_bars", |b| {
        b.iter(|| analyze(black_box(&bars), Horizon::MultiDay { window: 5 }, 50, 0.0))
    });

    group.finish();
}

// ── 4. Weekly Aggregation ────────────────────────────────────────────

fn bench_weekly_aggregation(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
    let provider = SyntheticProvider::new(today);
    let daily = provider.daily_bars("BENCH", today - chrono::Duration::days(1800), today);

    c.bench_function("aggregate_weekly_1800_days", |b| {
        b.iter(|| aggregate_weekly(black_box(&daily)))
    });
}

criterion_group!(
    benches,
    bench_transform,
    bench_baseline,
    bench_analyze,
    bench_weekly_aggregation,
);
criterion_main!(benches);
