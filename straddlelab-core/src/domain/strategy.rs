//! Strategy kinds the engine knows how to classify.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Option strategy whose payoff rule drives classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Long straddle: profits when the move escapes both breakevens.
    Straddle,
    /// Short straddle: the long-straddle rule with inverted labels.
    ShortStraddle,
    /// Iron condor: profits while the move stays strictly inside the band.
    IronCondor,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Straddle,
        StrategyKind::ShortStraddle,
        StrategyKind::IronCondor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Straddle => "straddle",
            StrategyKind::ShortStraddle => "short-straddle",
            StrategyKind::IronCondor => "iron-condor",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown strategy '{0}'. Valid: straddle, short-straddle, iron-condor")]
pub struct ParseStrategyError(pub String);

impl FromStr for StrategyKind {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "straddle" | "long-straddle" => Ok(StrategyKind::Straddle),
            "short-straddle" => Ok(StrategyKind::ShortStraddle),
            "iron-condor" | "condor" => Ok(StrategyKind::IronCondor),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}
