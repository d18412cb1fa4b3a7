//! Domain types for StraddleLab

pub mod movement;
pub mod price;
pub mod strategy;
pub mod thresholds;

pub use movement::Movement;
pub use price::{normalize_series, PricePoint};
pub use strategy::{ParseStrategyError, StrategyKind};
pub use thresholds::{BreakevenThresholds, ThresholdError};
