//! The profitability engine: one parameterized pipeline for every strategy.

use serde::{Deserialize, Serialize};

use super::outlier::{filter_outliers, OUTLIER_LIMIT};
use super::report::{aggregate, ProfitabilityReport};
use super::window::{generate_windows, MAX_WINDOWS};
use crate::domain::{normalize_series, BreakevenThresholds, Movement, PricePoint, StrategyKind};

/// Tunables for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum windows generated per series.
    pub max_windows: usize,
    /// Absolute fractional move above which a window is an outlier.
    pub outlier_limit: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_windows: MAX_WINDOWS,
            outlier_limit: OUTLIER_LIMIT,
        }
    }
}

/// Stateless analysis engine. Safe to share across threads; each call is
/// independent of every other.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfitabilityEngine {
    config: EngineConfig,
}

impl ProfitabilityEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Normalize the series and cut it into return windows, newest first.
    pub fn movements(&self, series: &[PricePoint], horizon_days: usize) -> Vec<Movement> {
        let normalized = normalize_series(series);
        generate_windows(&normalized, horizon_days, self.config.max_windows)
    }

    /// Run the full pipeline and return the report.
    ///
    /// Never fails: thresholds are validated at construction, and
    /// insufficient data produces a `none`-quality report.
    pub fn analyze(
        &self,
        series: &[PricePoint],
        horizon_days: usize,
        thresholds: &BreakevenThresholds,
        strategy: StrategyKind,
    ) -> ProfitabilityReport {
        let movements = self.movements(series, horizon_days);
        let filtered = filter_outliers(&movements, self.config.outlier_limit);
        let report = aggregate(&filtered, thresholds, strategy, horizon_days);

        tracing::debug!(
            %strategy,
            horizon_days,
            points = series.len(),
            windows = movements.len(),
            samples = report.total_samples,
            profitable_rate = report.profitable_rate,
            quality = %report.data_quality,
            "profitability analysis complete"
        );

        report
    }
}

/// Analyze with the default engine configuration.
pub fn analyze_profitability(
    series: &[PricePoint],
    horizon_days: usize,
    thresholds: &BreakevenThresholds,
    strategy: StrategyKind,
) -> ProfitabilityReport {
    ProfitabilityEngine::default().analyze(series, horizon_days, thresholds, strategy)
}
