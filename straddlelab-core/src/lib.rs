//! StraddleLab Core: price windows, payoff classification, profitability reports.
//!
//! This crate contains the statistical heart of StraddleLab:
//! - Domain types (price points, movements, strategy kinds, breakeven thresholds)
//! - Window generation over a daily close series, newest first
//! - Outlier filtering with fallback to the unfiltered set
//! - Payoff classifiers for long straddles, short straddles and iron condors
//! - The profitability aggregator and its report
//! - Breakeven derivation from option legs
//! - Price data plumbing (Yahoo chart API, Parquet cache, response cache)
//!
//! The analysis pipeline is synchronous and pure. All I/O lives in `data`.

pub mod analysis;
pub mod breakeven;
pub mod data;
pub mod domain;

pub use analysis::{
    analyze_profitability, DataQuality, EngineConfig, ProfitabilityEngine, ProfitabilityReport,
};
pub use breakeven::{BreakevenError, Breakevens, IronCondorLegs, StraddleLegs};
pub use domain::{BreakevenThresholds, Movement, PricePoint, StrategyKind, ThresholdError};
