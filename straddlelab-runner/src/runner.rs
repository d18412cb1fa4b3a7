//! Analysis runner: wires data loading, breakeven derivation and the engine.
//!
//! Two entry points:
//! - `run_analysis()`: loads the series for a config, then runs. Used by the CLI.
//! - `run_analysis_from_data()`: takes a pre-loaded series. Used by scans,
//!   which analyze several horizons against one load.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use straddlelab_core::analysis::{ProfitabilityEngine, ProfitabilityReport};
use straddlelab_core::breakeven::{BreakevenError, Breakevens, IronCondorLegs, StraddleLegs};
use straddlelab_core::data::{DataSource, ParquetCache, PriceProvider};

use crate::config::{AnalysisConfig, ConfigError, StrategyConfig};
use crate::data_loader::{load_series, LoadError, LoadOptions, LoadedSeries};
use crate::premium::{estimate_straddle_premium, PremiumSource};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("breakeven error: {0}")]
    Breakeven(#[from] BreakevenError),
    #[error("no closes loaded for '{0}'")]
    EmptySeries(String),
    #[error("failed to start scan workers: {0}")]
    ThreadPool(String),
}

/// Complete result of one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    /// Latest close in the loaded range.
    pub reference_price: f64,
    pub reference_date: NaiveDate,
    pub breakevens: Breakevens,
    /// Straddle premium per share; `None` for iron condors.
    pub premium: Option<f64>,
    pub premium_source: PremiumSource,
    pub report: ProfitabilityReport,
    pub source: DataSource,
    pub has_synthetic: bool,
    pub dataset_hash: String,
    /// BLAKE3 of the config that produced this result; `None` for
    /// pre-loaded runs.
    pub config_hash: Option<String>,
}

impl AnalysisResult {
    /// True when any input was synthesized or estimated.
    pub fn is_estimated(&self) -> bool {
        self.has_synthetic || self.premium_source.is_estimated()
    }
}

/// Load data for `config` and analyze it.
///
/// The date range comes from the config; `base` supplies the offline,
/// synthetic and force flags.
pub fn run_analysis(
    config: &AnalysisConfig,
    cache: &ParquetCache,
    provider: Option<&dyn PriceProvider>,
    base: &LoadOptions,
) -> Result<AnalysisResult, RunError> {
    config.validate()?;
    let config_hash = config.config_hash()?;
    let opts = LoadOptions {
        start: config.analysis.start_date,
        end: config.analysis.end_date,
        ..base.clone()
    };
    let loaded = load_series(&config.analysis.symbol, cache, provider, None, &opts)?;

    let mut result = run_analysis_from_data(
        &loaded,
        config.analysis.horizon_days,
        &config.strategy,
        &ProfitabilityEngine::default(),
    )?;
    result.config_hash = Some(config_hash);
    Ok(result)
}

/// Analyze a pre-loaded series without I/O.
pub fn run_analysis_from_data(
    loaded: &LoadedSeries,
    horizon_days: usize,
    strategy: &StrategyConfig,
    engine: &ProfitabilityEngine,
) -> Result<AnalysisResult, RunError> {
    let latest = loaded
        .points
        .last()
        .ok_or_else(|| RunError::EmptySeries(loaded.symbol.clone()))?;
    let reference_price = latest.close;

    let (breakevens, premium, premium_source) =
        derive_breakevens(strategy, reference_price, horizon_days)?;
    let report = engine.analyze(
        &loaded.points,
        horizon_days,
        &breakevens.thresholds,
        breakevens.strategy,
    );

    tracing::info!(
        symbol = %loaded.symbol,
        strategy = %breakevens.strategy,
        horizon_days,
        samples = report.total_samples,
        profitable_rate = report.profitable_rate,
        quality = %report.data_quality,
        "analysis complete"
    );

    Ok(AnalysisResult {
        symbol: loaded.symbol.clone(),
        reference_price,
        reference_date: latest.date,
        breakevens,
        premium,
        premium_source,
        report,
        source: loaded.source,
        has_synthetic: loaded.has_synthetic,
        dataset_hash: loaded.dataset_hash.clone(),
        config_hash: None,
    })
}

fn derive_breakevens(
    strategy: &StrategyConfig,
    reference_price: f64,
    horizon_days: usize,
) -> Result<(Breakevens, Option<f64>, PremiumSource), RunError> {
    let kind = strategy.kind();
    match *strategy {
        StrategyConfig::Straddle { strike, premium }
        | StrategyConfig::ShortStraddle { strike, premium } => {
            let (premium, source) = match premium {
                Some(p) => (p, PremiumSource::Provided),
                None => (
                    estimate_straddle_premium(reference_price, horizon_days),
                    PremiumSource::Estimated,
                ),
            };
            let legs = StraddleLegs {
                strike: strike.unwrap_or(reference_price),
                premium,
                current_price: Some(reference_price),
            };
            Ok((legs.breakevens(kind)?, Some(premium), source))
        }
        StrategyConfig::IronCondor {
            long_put,
            short_put,
            short_call,
            long_call,
            credit,
            debit,
            current_price,
        } => {
            let legs = IronCondorLegs {
                long_put,
                short_put,
                short_call,
                long_call,
                credit,
                debit,
                current_price: current_price.or(Some(reference_price)),
            };
            Ok((legs.breakevens()?, None, PremiumSource::Legs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use straddlelab_core::analysis::DataQuality;
    use straddlelab_core::domain::{PricePoint, StrategyKind};

    fn loaded(closes: &[f64]) -> LoadedSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        LoadedSeries {
            symbol: "TEST".into(),
            points: closes
                .iter()
                .enumerate()
                .map(|(i, &c)| PricePoint::new(base + Duration::days(i as i64), c))
                .collect(),
            source: DataSource::Cache,
            has_synthetic: false,
            dataset_hash: "abc".into(),
        }
    }

    const SCENARIO: [f64; 10] = [
        100.0, 105.0, 100.0, 95.0, 100.0, 106.0, 100.0, 94.0, 100.0, 101.0,
    ];

    #[test]
    fn provided_premium_sets_breakevens_around_strike() {
        let strategy = StrategyConfig::Straddle {
            strike: Some(100.0),
            premium: Some(3.0),
        };
        let r = run_analysis_from_data(
            &loaded(&SCENARIO),
            1,
            &strategy,
            &ProfitabilityEngine::default(),
        )
        .unwrap();

        assert_eq!(r.reference_price, 101.0);
        assert_eq!(r.premium_source, PremiumSource::Provided);
        assert_eq!(r.breakevens.upper_price, 103.0);
        assert_eq!(r.report.profitable_count, 8);
        assert!(!r.is_estimated());
    }

    #[test]
    fn missing_premium_is_estimated_at_the_money() {
        let strategy = StrategyConfig::ShortStraddle {
            strike: None,
            premium: None,
        };
        let r = run_analysis_from_data(
            &loaded(&SCENARIO),
            30,
            &strategy,
            &ProfitabilityEngine::default(),
        )
        .unwrap();

        assert_eq!(r.breakevens.reference_price, 101.0);
        assert!((r.premium.unwrap() - 101.0 * 0.036).abs() < 1e-9);
        assert!(r.is_estimated());
        assert_eq!(r.report.strategy, StrategyKind::ShortStraddle);
        assert_eq!(r.report.data_quality, DataQuality::None);
    }

    #[test]
    fn off_the_money_strike_is_measured_from_latest_close() {
        let strategy = StrategyConfig::ShortStraddle {
            strike: Some(90.0),
            premium: Some(5.0),
        };
        let r = run_analysis_from_data(
            &loaded(&[100.0, 103.0, 100.0, 103.0, 100.0]),
            1,
            &strategy,
            &ProfitabilityEngine::default(),
        )
        .unwrap();

        assert_eq!(r.breakevens.reference_price, 100.0);
        assert_eq!(r.breakevens.upper_price, 95.0);
        assert_eq!(r.report.total_samples, 4);
        assert_eq!(r.report.profitable_count, 0);
    }

    #[test]
    fn condor_uses_latest_close_as_reference() {
        let strategy = StrategyConfig::IronCondor {
            long_put: 90.0,
            short_put: 95.0,
            short_call: 105.0,
            long_call: 110.0,
            credit: 2.0,
            debit: 0.5,
            current_price: None,
        };
        let r = run_analysis_from_data(
            &loaded(&SCENARIO),
            1,
            &strategy,
            &ProfitabilityEngine::default(),
        )
        .unwrap();

        assert_eq!(r.breakevens.reference_price, 101.0);
        assert_eq!(r.breakevens.upper_price, 106.5);
        assert_eq!(r.premium, None);
        assert_eq!(r.report.buckets.total(), r.report.total_samples);
    }

    #[test]
    fn invalid_condor_strikes_are_rejected() {
        let strategy = StrategyConfig::IronCondor {
            long_put: 100.0,
            short_put: 95.0,
            short_call: 105.0,
            long_call: 110.0,
            credit: 2.0,
            debit: 0.5,
            current_price: None,
        };
        let err = run_analysis_from_data(
            &loaded(&SCENARIO),
            1,
            &strategy,
            &ProfitabilityEngine::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RunError::Breakeven(_)));
    }

    #[test]
    fn empty_series_is_an_error() {
        let strategy = StrategyConfig::at_the_money(StrategyKind::Straddle);
        let err =
            run_analysis_from_data(&loaded(&[]), 1, &strategy, &ProfitabilityEngine::default())
                .unwrap_err();
        assert!(matches!(err, RunError::EmptySeries(_)));
    }
}
