//! Profitability aggregation and the report value object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::classifier::{PayoffClassifier, Zone};
use super::outlier::FilteredMovements;
use crate::domain::{BreakevenThresholds, StrategyKind};

/// Coarse grade of how much history backs a report, derived purely from
/// the sample count.
///
/// | samples | grade   |
/// |---------|---------|
/// | 0       | none    |
/// | 1–4     | limited |
/// | 5–19    | low     |
/// | 20–49   | medium  |
/// | ≥ 50    | high    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    None,
    Limited,
    Low,
    Medium,
    High,
}

impl DataQuality {
    pub fn from_samples(samples: usize) -> Self {
        match samples {
            0 => DataQuality::None,
            1..=4 => DataQuality::Limited,
            5..=19 => DataQuality::Low,
            20..=49 => DataQuality::Medium,
            _ => DataQuality::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataQuality::None => "none",
            DataQuality::Limited => "limited",
            DataQuality::Low => "low",
            DataQuality::Medium => "medium",
            DataQuality::High => "high",
        }
    }
}

impl fmt::Display for DataQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown data quality '{0}'. Valid: none, limited, low, medium, high")]
pub struct ParseQualityError(pub String);

impl FromStr for DataQuality {
    type Err = ParseQualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(DataQuality::None),
            "limited" => Ok(DataQuality::Limited),
            "low" => Ok(DataQuality::Low),
            "medium" => Ok(DataQuality::Medium),
            "high" => Ok(DataQuality::High),
            _ => Err(ParseQualityError(s.to_string())),
        }
    }
}

/// Per-zone tallies. Always sums to `total_samples`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    pub above_upper: usize,
    pub between: usize,
    pub below_lower: usize,
}

impl BucketCounts {
    fn record(&mut self, zone: Zone) {
        match zone {
            Zone::AboveUpper => self.above_upper += 1,
            Zone::Between => self.between += 1,
            Zone::BelowLower => self.below_lower += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.above_upper + self.between + self.below_lower
    }
}

/// Aggregate result of one analysis. Rates and move statistics are
/// percentages (×100); breakevens are echoed as percentages too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitabilityReport {
    pub strategy: StrategyKind,
    pub horizon_days: usize,
    pub upper_breakeven_pct: f64,
    pub lower_breakeven_pct: f64,
    pub total_samples: usize,
    pub profitable_count: usize,
    /// `100 * profitable_count / total_samples`, 0 when there are no samples.
    pub profitable_rate: f64,
    /// Complement of `profitable_rate`, 0 when there are no samples.
    pub loss_rate: f64,
    pub buckets: BucketCounts,
    pub avg_abs_move: f64,
    pub max_abs_move: f64,
    pub min_abs_move: f64,
    pub data_quality: DataQuality,
    pub outliers_removed: usize,
    pub outlier_fallback: bool,
}

impl ProfitabilityReport {
    /// All-zero report with quality `none`.
    pub fn empty(
        strategy: StrategyKind,
        horizon_days: usize,
        thresholds: &BreakevenThresholds,
    ) -> Self {
        Self {
            strategy,
            horizon_days,
            upper_breakeven_pct: thresholds.upper_pct() * 100.0,
            lower_breakeven_pct: thresholds.lower_pct() * 100.0,
            total_samples: 0,
            profitable_count: 0,
            profitable_rate: 0.0,
            loss_rate: 0.0,
            buckets: BucketCounts::default(),
            avg_abs_move: 0.0,
            max_abs_move: 0.0,
            min_abs_move: 0.0,
            data_quality: DataQuality::None,
            outliers_removed: 0,
            outlier_fallback: false,
        }
    }

    pub fn has_samples(&self) -> bool {
        self.total_samples > 0
    }

    /// Share of samples in a bucket, as a percentage.
    pub fn bucket_rate(&self, count: usize) -> f64 {
        rate(count, self.total_samples)
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Tally classified movements into a report.
pub fn aggregate(
    filtered: &FilteredMovements,
    thresholds: &BreakevenThresholds,
    strategy: StrategyKind,
    horizon_days: usize,
) -> ProfitabilityReport {
    let movements = &filtered.movements;
    if movements.is_empty() {
        return ProfitabilityReport::empty(strategy, horizon_days, thresholds);
    }

    let mut buckets = BucketCounts::default();
    let mut profitable_count = 0;
    let mut sum_abs = 0.0;
    let mut max_abs = 0.0_f64;
    let mut min_abs = f64::INFINITY;

    for movement in movements {
        let c = strategy.classify(movement.percent_move, thresholds);
        buckets.record(c.zone);
        if c.profitable {
            profitable_count += 1;
        }
        let abs = movement.abs_move();
        sum_abs += abs;
        max_abs = max_abs.max(abs);
        min_abs = min_abs.min(abs);
    }

    let total_samples = movements.len();
    let profitable_rate = rate(profitable_count, total_samples);

    ProfitabilityReport {
        strategy,
        horizon_days,
        upper_breakeven_pct: thresholds.upper_pct() * 100.0,
        lower_breakeven_pct: thresholds.lower_pct() * 100.0,
        total_samples,
        profitable_count,
        profitable_rate,
        loss_rate: rate(total_samples - profitable_count, total_samples),
        buckets,
        avg_abs_move: sum_abs / total_samples as f64 * 100.0,
        max_abs_move: max_abs * 100.0,
        min_abs_move: min_abs * 100.0,
        data_quality: DataQuality::from_samples(total_samples),
        outliers_removed: filtered.removed,
        outlier_fallback: filtered.fell_back,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Movement;
    use chrono::NaiveDate;

    fn filtered(moves: &[f64]) -> FilteredMovements {
        let d = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        FilteredMovements {
            movements: moves
                .iter()
                .enumerate()
                .map(|(i, &m)| Movement {
                    start_index: i,
                    end_index: i + 1,
                    start_date: d,
                    end_date: d,
                    start_price: 100.0,
                    end_price: 100.0 * (1.0 + m),
                    percent_move: m,
                })
                .collect(),
            removed: 0,
            fell_back: false,
        }
    }

    #[test]
    fn quality_table_boundaries() {
        assert_eq!(DataQuality::from_samples(0), DataQuality::None);
        assert_eq!(DataQuality::from_samples(1), DataQuality::Limited);
        assert_eq!(DataQuality::from_samples(4), DataQuality::Limited);
        assert_eq!(DataQuality::from_samples(5), DataQuality::Low);
        assert_eq!(DataQuality::from_samples(19), DataQuality::Low);
        assert_eq!(DataQuality::from_samples(20), DataQuality::Medium);
        assert_eq!(DataQuality::from_samples(49), DataQuality::Medium);
        assert_eq!(DataQuality::from_samples(50), DataQuality::High);
        assert_eq!(DataQuality::from_samples(10_000), DataQuality::High);
    }

    #[test]
    fn quality_orders_from_none_to_high() {
        assert!(DataQuality::None < DataQuality::Limited);
        assert!(DataQuality::Medium < DataQuality::High);
        assert_eq!("Medium".parse(), Ok(DataQuality::Medium));
    }

    #[test]
    fn empty_input_gives_zero_report() {
        let t = BreakevenThresholds::symmetric(0.05).unwrap();
        let r = aggregate(&filtered(&[]), &t, StrategyKind::Straddle, 30);
        assert_eq!(r.total_samples, 0);
        assert_eq!(r.profitable_rate, 0.0);
        assert_eq!(r.loss_rate, 0.0);
        assert_eq!(r.data_quality, DataQuality::None);
        assert_eq!(r.upper_breakeven_pct, 5.0);
    }

    #[test]
    fn straddle_tallies_and_stats() {
        let t = BreakevenThresholds::symmetric(0.05).unwrap();
        let r = aggregate(&filtered(&[0.10, -0.08, 0.01, -0.02]), &t, StrategyKind::Straddle, 5);
        assert_eq!(r.total_samples, 4);
        assert_eq!(r.profitable_count, 2);
        assert_eq!(r.profitable_rate, 50.0);
        assert_eq!(r.loss_rate, 50.0);
        assert_eq!(r.buckets, BucketCounts { above_upper: 1, between: 2, below_lower: 1 });
        assert!((r.avg_abs_move - 5.25).abs() < 1e-9);
        assert!((r.max_abs_move - 10.0).abs() < 1e-9);
        assert!((r.min_abs_move - 1.0).abs() < 1e-9);
        assert_eq!(r.data_quality, DataQuality::Limited);
    }

    #[test]
    fn condor_buckets_partition_samples() {
        let t = BreakevenThresholds::symmetric(0.05).unwrap();
        let r = aggregate(&filtered(&[0.05, -0.05, 0.0, 0.2]), &t, StrategyKind::IronCondor, 5);
        assert_eq!(r.buckets.total(), r.total_samples);
        assert_eq!(r.profitable_count, 1);
        assert_eq!(r.buckets.above_upper, 2);
        assert_eq!(r.buckets.below_lower, 1);
        assert_eq!(r.bucket_rate(r.buckets.above_upper), 50.0);
    }
}
