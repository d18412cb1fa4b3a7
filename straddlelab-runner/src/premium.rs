//! Straddle premium estimation for when no live quote is available.

use serde::{Deserialize, Serialize};

/// Base premium as a fraction of price for a 30-day straddle.
pub const BASE_PREMIUM_RATE: f64 = 0.03;

/// Volatility uplift applied on top of the base rate.
pub const VOLATILITY_FACTOR: f64 = 1.2;

/// Where the premium used for breakevens came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumSource {
    /// Supplied by the caller (config or CLI flag).
    Provided,
    /// Derived by `estimate_straddle_premium`.
    Estimated,
    /// Iron condor legs carry their own credit and debit.
    Legs,
}

impl PremiumSource {
    pub fn is_estimated(&self) -> bool {
        matches!(self, PremiumSource::Estimated)
    }
}

/// `price × 3% × sqrt(horizon / 30) × 1.2`.
///
/// A square-root-of-time heuristic, not a pricing model.
pub fn estimate_straddle_premium(price: f64, horizon_days: usize) -> f64 {
    let time_factor = (horizon_days as f64 / 30.0).sqrt();
    price * BASE_PREMIUM_RATE * time_factor * VOLATILITY_FACTOR
}
