//! TOML configuration for single analyses and multi-ticker scans.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use straddlelab_core::analysis::DataQuality;
use straddlelab_core::domain::StrategyKind;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Configuration for one analysis run.
///
/// ```toml
/// [analysis]
/// symbol = "SPY"
/// start_date = "2022-01-01"
/// end_date = "2024-12-31"
/// horizon_days = 30
///
/// [strategy]
/// type = "straddle"
/// premium = 12.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub analysis: AnalysisSection,
    pub strategy: StrategyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Holding period in trading days (days to expiration).
    pub horizon_days: usize,
}

/// Option legs for the analyzed position.
///
/// Straddle strikes default to the latest close (at the money). A missing
/// premium is estimated from the price and horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    Straddle {
        #[serde(default)]
        strike: Option<f64>,
        #[serde(default)]
        premium: Option<f64>,
    },
    ShortStraddle {
        #[serde(default)]
        strike: Option<f64>,
        #[serde(default)]
        premium: Option<f64>,
    },
    IronCondor {
        long_put: f64,
        short_put: f64,
        short_call: f64,
        long_call: f64,
        credit: f64,
        #[serde(default)]
        debit: f64,
        #[serde(default)]
        current_price: Option<f64>,
    },
}

impl StrategyConfig {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyConfig::Straddle { .. } => StrategyKind::Straddle,
            StrategyConfig::ShortStraddle { .. } => StrategyKind::ShortStraddle,
            StrategyConfig::IronCondor { .. } => StrategyKind::IronCondor,
        }
    }

    /// An at-the-money straddle of the given kind with an estimated premium.
    ///
    /// Iron condors have no default legs, so they map to a long straddle.
    pub fn at_the_money(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::ShortStraddle => StrategyConfig::ShortStraddle {
                strike: None,
                premium: None,
            },
            StrategyKind::Straddle | StrategyKind::IronCondor => StrategyConfig::Straddle {
                strike: None,
                premium: None,
            },
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&read_config(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analysis;
        if a.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("analysis.symbol is empty".into()));
        }
        validate_range(a.start_date, a.end_date)?;
        if a.horizon_days == 0 {
            return Err(ConfigError::Invalid(
                "analysis.horizon_days must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Deterministic BLAKE3 id of this configuration.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

/// Configuration for an automated scan over many tickers.
///
/// ```toml
/// [scan]
/// symbols = ["SPY", "QQQ", "IWM"]
/// horizons = [7, 14, 30]
/// start_date = "2022-01-01"
/// end_date = "2024-12-31"
/// profitable_threshold = 55.0
/// min_data_quality = "medium"
/// max_concurrent = 3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub scan: ScanSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSection {
    pub symbols: Vec<String>,
    #[serde(default = "default_horizons")]
    pub horizons: Vec<usize>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_strategy")]
    pub strategy: StrategyKind,
    /// Minimum profitable rate (percent) for a candidate.
    #[serde(default = "default_profitable_threshold")]
    pub profitable_threshold: f64,
    #[serde(default = "default_min_data_quality")]
    pub min_data_quality: DataQuality,
    /// Worker threads used for the scan.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

/// Upper bound on horizons analyzed per ticker.
pub const MAX_HORIZONS_PER_SYMBOL: usize = 10;

fn default_horizons() -> Vec<usize> {
    vec![30]
}

fn default_strategy() -> StrategyKind {
    StrategyKind::Straddle
}

fn default_profitable_threshold() -> f64 {
    55.0
}

fn default_min_data_quality() -> DataQuality {
    DataQuality::Medium
}

fn default_max_concurrent() -> usize {
    3
}

impl ScanConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&read_config(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scan;
        if s.symbols.is_empty() {
            return Err(ConfigError::Invalid("scan.symbols is empty".into()));
        }
        if s.horizons.is_empty() || s.horizons.len() > MAX_HORIZONS_PER_SYMBOL {
            return Err(ConfigError::Invalid(format!(
                "scan.horizons must list 1 to {MAX_HORIZONS_PER_SYMBOL} values"
            )));
        }
        if s.horizons.contains(&0) {
            return Err(ConfigError::Invalid(
                "scan.horizons must be at least 1".into(),
            ));
        }
        if s.strategy == StrategyKind::IronCondor {
            return Err(ConfigError::Invalid(
                "scan.strategy must be a straddle; iron condors need explicit legs".into(),
            ));
        }
        if !(0.0..=100.0).contains(&s.profitable_threshold) {
            return Err(ConfigError::Invalid(format!(
                "scan.profitable_threshold must be within 0..=100, got {}",
                s.profitable_threshold
            )));
        }
        if s.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "scan.max_concurrent must be at least 1".into(),
            ));
        }
        validate_range(s.start_date, s.end_date)
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), ConfigError> {
    if start > end {
        return Err(ConfigError::Invalid(format!(
            "start_date {start} is after end_date {end}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRADDLE_TOML: &str = r#"
        [analysis]
        symbol = "SPY"
        start_date = "2022-01-03"
        end_date = "2024-12-31"
        horizon_days = 30

        [strategy]
        type = "straddle"
        premium = 12.5
    "#;

    #[test]
    fn parses_straddle_config() {
        let config = AnalysisConfig::from_toml(STRADDLE_TOML).unwrap();
        assert_eq!(config.analysis.symbol, "SPY");
        assert_eq!(config.analysis.horizon_days, 30);
        assert_eq!(
            config.strategy,
            StrategyConfig::Straddle {
                strike: None,
                premium: Some(12.5)
            }
        );
        assert_eq!(config.strategy.kind(), StrategyKind::Straddle);
    }

    #[test]
    fn parses_iron_condor_config() {
        let config = AnalysisConfig::from_toml(
            r#"
            [analysis]
            symbol = "QQQ"
            start_date = "2023-01-01"
            end_date = "2023-12-31"
            horizon_days = 14

            [strategy]
            type = "iron_condor"
            long_put = 380.0
            short_put = 390.0
            short_call = 420.0
            long_call = 430.0
            credit = 3.2
            debit = 0.8
            "#,
        )
        .unwrap();
        assert_eq!(config.strategy.kind(), StrategyKind::IronCondor);
        match config.strategy {
            StrategyConfig::IronCondor { current_price, debit, .. } => {
                assert_eq!(current_price, None);
                assert_eq!(debit, 0.8);
            }
            other => panic!("expected iron condor, got {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_horizon() {
        let toml = STRADDLE_TOML.replace("horizon_days = 30", "horizon_days = 0");
        let err = AnalysisConfig::from_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("horizon_days"));
    }

    #[test]
    fn rejects_inverted_dates() {
        let toml = STRADDLE_TOML.replace("2022-01-03", "2025-06-01");
        assert!(matches!(
            AnalysisConfig::from_toml(&toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_unknown_strategy_type() {
        let toml = STRADDLE_TOML.replace("\"straddle\"", "\"butterfly\"");
        assert!(matches!(
            AnalysisConfig::from_toml(&toml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn scan_defaults() {
        let config = ScanConfig::from_toml(
            r#"
            [scan]
            symbols = ["SPY", "QQQ"]
            start_date = "2022-01-01"
            end_date = "2024-12-31"
            "#,
        )
        .unwrap();
        assert_eq!(config.scan.horizons, vec![30]);
        assert_eq!(config.scan.strategy, StrategyKind::Straddle);
        assert_eq!(config.scan.profitable_threshold, 55.0);
        assert_eq!(config.scan.min_data_quality, DataQuality::Medium);
        assert_eq!(config.scan.max_concurrent, 3);
    }

    #[test]
    fn scan_rejects_condor_strategy() {
        let err = ScanConfig::from_toml(
            r#"
            [scan]
            symbols = ["SPY"]
            start_date = "2022-01-01"
            end_date = "2024-12-31"
            strategy = "iron-condor"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("iron condors"));
    }

    #[test]
    fn config_hash_is_deterministic() {
        let a = AnalysisConfig::from_toml(STRADDLE_TOML).unwrap();
        let b = AnalysisConfig::from_toml(STRADDLE_TOML).unwrap();
        assert_eq!(a.config_hash().unwrap(), b.config_hash().unwrap());

        let mut c = a.clone();
        c.analysis.horizon_days = 7;
        assert_ne!(a.config_hash().unwrap(), c.config_hash().unwrap());
    }
}
