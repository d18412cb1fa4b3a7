//! Criterion benchmarks for StraddleLab hot paths.
//!
//! Benchmarks:
//! 1. Window generation over long series at several horizons
//! 2. Full profitability pipeline per strategy
//! 3. Classifier throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use straddlelab_core::analysis::{
    analyze_profitability, generate_windows, IronCondor, LongStraddle, PayoffClassifier,
    MAX_WINDOWS,
};
use straddlelab_core::domain::{BreakevenThresholds, PricePoint, StrategyKind};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(n: usize) -> Vec<PricePoint> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + (i as f64 * 0.013).cos() * 4.0;
            PricePoint::new(base_date + chrono::Duration::days(i as i64), close)
        })
        .collect()
}

// ── 1. Window Generation ─────────────────────────────────────────────

fn bench_windows(c: &mut Criterion) {
    let mut group = c.benchmark_group("windows");
    let series = make_series(2520);

    for h in [1usize, 7, 30] {
        group.bench_with_input(BenchmarkId::new("2520_closes", h), &h, |b, &h| {
            b.iter(|| generate_windows(black_box(&series), h, MAX_WINDOWS));
        });
    }

    group.finish();
}

// ── 2. Full Pipeline ─────────────────────────────────────────────────

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let series = make_series(2520);
    let thresholds = BreakevenThresholds::symmetric(0.04).unwrap();

    for strategy in StrategyKind::ALL {
        group.bench_with_input(
            BenchmarkId::new("2520_closes_h5", strategy.as_str()),
            &strategy,
            |b, &strategy| {
                b.iter(|| analyze_profitability(black_box(&series), 5, &thresholds, strategy));
            },
        );
    }

    group.finish();
}

// ── 3. Classifiers ───────────────────────────────────────────────────

fn bench_classifiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let thresholds = BreakevenThresholds::new(0.035, -0.03).unwrap();
    let moves: Vec<f64> = (0..1000).map(|i| (i as f64 - 500.0) / 5000.0).collect();

    group.bench_function("long_straddle_1000", |b| {
        b.iter(|| {
            moves
                .iter()
                .filter(|&&m| LongStraddle.classify(black_box(m), &thresholds).profitable)
                .count()
        });
    });
    group.bench_function("iron_condor_1000", |b| {
        b.iter(|| {
            moves
                .iter()
                .filter(|&&m| IronCondor.classify(black_box(m), &thresholds).profitable)
                .count()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_windows, bench_pipeline, bench_classifiers);
criterion_main!(benches);
