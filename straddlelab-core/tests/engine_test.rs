//! Integration tests for the profitability pipeline.
//!
//! Tests:
//! 1. Hand-computed straddle scenario over an alternating series
//! 2. Iron condor bucket partition on the same series
//! 3. Determinism: identical inputs serialize to identical bytes
//! 4. Outlier fallback keeps the unfiltered sample count
//! 5. Data-quality grades at the table boundaries
//! 6. Breakeven derivation feeding the engine end to end

use chrono::{Duration, NaiveDate};
use straddlelab_core::analysis::{analyze_profitability, DataQuality};
use straddlelab_core::breakeven::{IronCondorLegs, StraddleLegs};
use straddlelab_core::domain::{BreakevenThresholds, PricePoint, StrategyKind};

const SCENARIO: [f64; 10] = [
    100.0, 105.0, 100.0, 95.0, 100.0, 106.0, 100.0, 94.0, 100.0, 101.0,
];

/// Helper: one close per calendar day, oldest first.
fn series(closes: &[f64]) -> Vec<PricePoint> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::new(base + Duration::days(i as i64), c))
        .collect()
}

/// Helper: `n + 1` closes that produce exactly `n` one-day windows.
fn series_with_windows(n: usize) -> Vec<PricePoint> {
    let closes: Vec<f64> = (0..=n)
        .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
        .collect();
    series(&closes)
}

// ── 1. Straddle scenario ────────────────────────────────────────────

#[test]
fn straddle_scenario_matches_hand_computation() {
    // Forward one-day moves, newest first:
    //   +1.00%, +6.38%, -6.00%, -5.66%, +6.00%, +5.26%, -5.00%, -4.76%, +5.00%
    // Only +1.00% stays inside ±3%.
    let t = BreakevenThresholds::new(0.03, -0.03).unwrap();
    let r = analyze_profitability(&series(&SCENARIO), 1, &t, StrategyKind::Straddle);

    assert_eq!(r.total_samples, 9);
    assert_eq!(r.profitable_count, 8);
    assert_eq!(r.profitable_rate, 8.0 / 9.0 * 100.0);
    assert_eq!(r.buckets.above_upper, 4);
    assert_eq!(r.buckets.below_lower, 4);
    assert_eq!(r.buckets.between, 1);
    assert_eq!(r.data_quality, DataQuality::Low);
    assert_eq!(r.outliers_removed, 0);

    assert!((r.max_abs_move - 6.0 / 94.0 * 100.0).abs() < 1e-9);
    assert!((r.min_abs_move - 1.0).abs() < 1e-9);
    assert!((r.upper_breakeven_pct - 3.0).abs() < 1e-12);
}

#[test]
fn short_straddle_is_the_complement_on_the_scenario() {
    let t = BreakevenThresholds::new(0.03, -0.03).unwrap();
    let r = analyze_profitability(&series(&SCENARIO), 1, &t, StrategyKind::ShortStraddle);

    assert_eq!(r.total_samples, 9);
    assert_eq!(r.profitable_count, 1);
    assert!((r.profitable_rate + r.loss_rate - 100.0).abs() < 1e-9);
}

// ── 2. Iron condor scenario ─────────────────────────────────────────

#[test]
fn iron_condor_buckets_partition_samples() {
    let t = BreakevenThresholds::new(0.04, -0.04).unwrap();
    let r = analyze_profitability(&series(&SCENARIO), 1, &t, StrategyKind::IronCondor);

    assert_eq!(r.buckets.between, 1);
    assert_eq!(r.buckets.above_upper, 4);
    assert_eq!(r.buckets.below_lower, 4);
    assert_eq!(
        r.buckets.between + r.buckets.above_upper + r.buckets.below_lower,
        r.total_samples
    );
    assert_eq!(r.profitable_count, r.buckets.between);
}

// ── 3. Determinism ──────────────────────────────────────────────────

#[test]
fn identical_inputs_give_byte_identical_reports() {
    let t = BreakevenThresholds::new(0.025, -0.02).unwrap();
    let s = series(&SCENARIO);

    for strategy in StrategyKind::ALL {
        let a = serde_json::to_vec(&analyze_profitability(&s, 2, &t, strategy)).unwrap();
        let b = serde_json::to_vec(&analyze_profitability(&s, 2, &t, strategy)).unwrap();
        assert_eq!(a, b, "{strategy} report differs between runs");
    }
}

// ── 4. Outlier fallback ─────────────────────────────────────────────

#[test]
fn all_outliers_fall_back_to_unfiltered_count() {
    // Every one-day move is +900% or -90%.
    let s = series(&[1.0, 10.0, 1.0, 10.0, 1.0, 10.0, 1.0]);
    let t = BreakevenThresholds::symmetric(0.05).unwrap();
    let r = analyze_profitability(&s, 1, &t, StrategyKind::Straddle);

    assert_eq!(r.total_samples, 6);
    assert!(r.outlier_fallback);
    assert_eq!(r.outliers_removed, 0);
}

#[test]
fn partial_outliers_are_removed() {
    let s = series(&[100.0, 101.0, 300.0, 301.0]);
    let t = BreakevenThresholds::symmetric(0.05).unwrap();
    let r = analyze_profitability(&s, 1, &t, StrategyKind::Straddle);

    assert_eq!(r.total_samples, 2);
    assert_eq!(r.outliers_removed, 1);
    assert!(!r.outlier_fallback);
}

// ── 5. Data-quality boundaries ──────────────────────────────────────

#[test]
fn data_quality_at_window_count_boundaries() {
    let t = BreakevenThresholds::symmetric(0.03).unwrap();
    let cases = [
        (0, DataQuality::None),
        (4, DataQuality::Limited),
        (5, DataQuality::Low),
        (19, DataQuality::Low),
        (20, DataQuality::Medium),
        (49, DataQuality::Medium),
        (50, DataQuality::High),
    ];

    for (windows, expected) in cases {
        let r = analyze_profitability(&series_with_windows(windows), 1, &t, StrategyKind::Straddle);
        assert_eq!(r.total_samples, windows);
        assert_eq!(r.data_quality, expected, "{windows} windows");
    }
}

#[test]
fn empty_series_is_a_zero_report() {
    let t = BreakevenThresholds::symmetric(0.03).unwrap();
    let r = analyze_profitability(&[], 5, &t, StrategyKind::IronCondor);

    assert!(!r.has_samples());
    assert_eq!(r.profitable_rate, 0.0);
    assert_eq!(r.loss_rate, 0.0);
    assert_eq!(r.avg_abs_move, 0.0);
    assert_eq!(r.data_quality, DataQuality::None);
}

// ── 6. Legs → thresholds → report ───────────────────────────────────

#[test]
fn straddle_legs_drive_the_engine() {
    let legs = StraddleLegs {
        strike: 100.0,
        premium: 3.0,
        current_price: None,
    };
    let b = legs.breakevens(StrategyKind::Straddle).unwrap();
    assert_eq!(b.upper_price, 103.0);
    assert_eq!(b.lower_price, 97.0);

    let r = analyze_profitability(&series(&SCENARIO), 1, &b.thresholds, b.strategy);
    assert_eq!(r.profitable_count, 8);
}

#[test]
fn in_the_money_short_straddle_loses_when_spot_stays_above_upper() {
    // $85 / $95 breakevens with spot oscillating around 100-103
    let legs = StraddleLegs {
        strike: 90.0,
        premium: 5.0,
        current_price: Some(100.0),
    };
    let b = legs.breakevens(StrategyKind::ShortStraddle).unwrap();
    let r = analyze_profitability(
        &series(&[100.0, 103.0, 100.0, 103.0, 100.0]),
        1,
        &b.thresholds,
        b.strategy,
    );
    assert_eq!(r.total_samples, 4);
    assert_eq!(r.profitable_count, 0);
    assert_eq!(r.buckets.above_upper, 4);
}

#[test]
fn condor_legs_drive_the_engine() {
    let legs = IronCondorLegs {
        long_put: 90.0,
        short_put: 96.0,
        short_call: 104.0,
        long_call: 110.0,
        credit: 2.5,
        debit: 0.5,
        current_price: Some(100.0),
    };
    let b = legs.breakevens().unwrap();
    assert_eq!(b.upper_price, 106.0);
    assert_eq!(b.lower_price, 94.0);

    // ±6%: +6.00% and -6.00% sit exactly on a breakeven and count as losses.
    let r = analyze_profitability(&series(&SCENARIO), 1, &b.thresholds, b.strategy);
    assert_eq!(r.buckets.above_upper, 2);
    assert_eq!(r.buckets.below_lower, 1);
    assert_eq!(r.buckets.between, 6);
    assert_eq!(r.buckets.total(), r.total_samples);
}
