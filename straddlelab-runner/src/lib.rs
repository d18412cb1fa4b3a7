//! StraddleLab Runner: analysis orchestration, scans, export.
//!
//! This crate builds on `straddlelab-core` to provide:
//! - TOML configuration for single analyses and scans
//! - Data loading with cache/download/synthetic fallback, plus CSV import
//! - Premium estimation when no live quote is available
//! - Single-analysis runner deriving breakevens from option legs
//! - Multi-ticker scans on a bounded worker pool
//! - JSON and CSV export with strategy-specific field names

pub mod config;
pub mod data_loader;
pub mod export;
pub mod premium;
pub mod runner;
pub mod scan;

pub use config::{AnalysisConfig, ConfigError, ScanConfig, StrategyConfig};
pub use data_loader::{
    generate_synthetic_series, import_csv, load_series, LoadError, LoadOptions, LoadedSeries,
};
pub use export::{analysis_export, export_json, export_scan_csv, export_scan_json};
pub use premium::{estimate_straddle_premium, PremiumSource};
pub use runner::{run_analysis, run_analysis_from_data, AnalysisResult, RunError};
pub use scan::{run_scan, ScanFailure, ScanResult, SymbolScan};
