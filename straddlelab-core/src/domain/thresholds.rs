//! Breakeven thresholds, validated at construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected threshold input. Signals an upstream computation bug, not a
/// data-quality problem, so it is surfaced before any analysis runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("breakeven thresholds must be finite (upper={upper}, lower={lower})")]
    NotFinite { upper: f64, lower: f64 },

    #[error("upper breakeven ({upper}) must be above lower breakeven ({lower})")]
    Inverted { upper: f64, lower: f64 },
}

/// Fractional deviations from the reference price at which the strategy
/// breaks even. `0.05` means +5%.
///
/// Invariant: both finite and `upper_pct > lower_pct`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholds", into = "RawThresholds")]
pub struct BreakevenThresholds {
    upper_pct: f64,
    lower_pct: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawThresholds {
    upper_pct: f64,
    lower_pct: f64,
}

impl BreakevenThresholds {
    pub fn new(upper_pct: f64, lower_pct: f64) -> Result<Self, ThresholdError> {
        if !upper_pct.is_finite() || !lower_pct.is_finite() {
            return Err(ThresholdError::NotFinite {
                upper: upper_pct,
                lower: lower_pct,
            });
        }
        if upper_pct <= lower_pct {
            return Err(ThresholdError::Inverted {
                upper: upper_pct,
                lower: lower_pct,
            });
        }
        Ok(Self {
            upper_pct,
            lower_pct,
        })
    }

    /// Symmetric band `±width`.
    pub fn symmetric(width: f64) -> Result<Self, ThresholdError> {
        Self::new(width, -width)
    }

    pub fn upper_pct(&self) -> f64 {
        self.upper_pct
    }

    pub fn lower_pct(&self) -> f64 {
        self.lower_pct
    }
}

impl TryFrom<RawThresholds> for BreakevenThresholds {
    type Error = ThresholdError;

    fn try_from(raw: RawThresholds) -> Result<Self, Self::Error> {
        Self::new(raw.upper_pct, raw.lower_pct)
    }
}

impl From<BreakevenThresholds> for RawThresholds {
    fn from(t: BreakevenThresholds) -> Self {
        Self {
            upper_pct: t.upper_pct,
            lower_pct: t.lower_pct,
        }
    }
}
