//! Strategy payoff classification.
//!
//! A classifier decides, for one fractional move and a set of breakevens,
//! whether the move lands in the strategy's profit zone and which side of
//! the band it fell on. All comparisons against a breakeven are strict: a
//! move exactly on a breakeven is never a crossing and never inside the
//! condor's profit zone.

use serde::{Deserialize, Serialize};

use crate::domain::{BreakevenThresholds, StrategyKind};

/// Where a move landed relative to the breakevens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    AboveUpper,
    Between,
    BelowLower,
}

/// Outcome of classifying one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub profitable: bool,
    pub zone: Zone,
}

/// Trait for strategy payoff rules.
///
/// Implementations are pure: same move and thresholds, same answer.
pub trait PayoffClassifier: Send + Sync {
    /// Human-readable name (e.g., "straddle", "iron-condor").
    fn name(&self) -> &str;

    fn classify(&self, percent_move: f64, thresholds: &BreakevenThresholds) -> Classification;
}

/// Zone with strict crossings: on-breakeven moves count as `Between`.
fn crossing_zone(percent_move: f64, t: &BreakevenThresholds) -> Zone {
    if percent_move > t.upper_pct() {
        Zone::AboveUpper
    } else if percent_move < t.lower_pct() {
        Zone::BelowLower
    } else {
        Zone::Between
    }
}

/// Long straddle: profitable iff the move is strictly outside both breakevens.
pub struct LongStraddle;

impl PayoffClassifier for LongStraddle {
    fn name(&self) -> &str {
        "straddle"
    }

    fn classify(&self, percent_move: f64, thresholds: &BreakevenThresholds) -> Classification {
        let zone = crossing_zone(percent_move, thresholds);
        Classification {
            profitable: zone != Zone::Between,
            zone,
        }
    }
}

/// Short straddle: the long-straddle rule with the labels swapped.
pub struct ShortStraddle;

impl PayoffClassifier for ShortStraddle {
    fn name(&self) -> &str {
        "short-straddle"
    }

    fn classify(&self, percent_move: f64, thresholds: &BreakevenThresholds) -> Classification {
        let long = LongStraddle.classify(percent_move, thresholds);
        Classification {
            profitable: !long.profitable,
            zone: long.zone,
        }
    }
}

/// Iron condor: profitable iff the move is strictly inside the band.
///
/// Moves exactly on a breakeven fall into the loss bucket on that side, so
/// the three zones always partition the sample.
pub struct IronCondor;

impl PayoffClassifier for IronCondor {
    fn name(&self) -> &str {
        "iron-condor"
    }

    fn classify(&self, percent_move: f64, thresholds: &BreakevenThresholds) -> Classification {
        let zone = if percent_move >= thresholds.upper_pct() {
            Zone::AboveUpper
        } else if percent_move <= thresholds.lower_pct() {
            Zone::BelowLower
        } else {
            Zone::Between
        };
        Classification {
            profitable: zone == Zone::Between,
            zone,
        }
    }
}

impl PayoffClassifier for StrategyKind {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn classify(&self, percent_move: f64, thresholds: &BreakevenThresholds) -> Classification {
        match self {
            StrategyKind::Straddle => LongStraddle.classify(percent_move, thresholds),
            StrategyKind::ShortStraddle => ShortStraddle.classify(percent_move, thresholds),
            StrategyKind::IronCondor => IronCondor.classify(percent_move, thresholds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band() -> BreakevenThresholds {
        BreakevenThresholds::new(0.05, -0.04).unwrap()
    }

    #[test]
    fn straddle_profits_outside_band() {
        let t = band();
        assert_eq!(
            LongStraddle.classify(0.06, &t),
            Classification { profitable: true, zone: Zone::AboveUpper }
        );
        assert_eq!(
            LongStraddle.classify(-0.041, &t),
            Classification { profitable: true, zone: Zone::BelowLower }
        );
        assert!(!LongStraddle.classify(0.0, &t).profitable);
    }

    #[test]
    fn straddle_breakeven_is_not_a_crossing() {
        let t = band();
        assert!(!LongStraddle.classify(0.05, &t).profitable);
        assert!(!LongStraddle.classify(-0.04, &t).profitable);
    }

    #[test]
    fn short_straddle_inverts_labels_only() {
        let t = band();
        for m in [-0.2, -0.04, 0.0, 0.05, 0.3] {
            let long = LongStraddle.classify(m, &t);
            let short = ShortStraddle.classify(m, &t);
            assert_eq!(long.zone, short.zone);
            assert_ne!(long.profitable, short.profitable);
        }
    }

    #[test]
    fn condor_profits_strictly_inside() {
        let t = band();
        assert!(IronCondor.classify(0.0, &t).profitable);
        assert!(IronCondor.classify(0.0499, &t).profitable);
        assert_eq!(IronCondor.classify(0.05, &t).zone, Zone::AboveUpper);
        assert_eq!(IronCondor.classify(-0.04, &t).zone, Zone::BelowLower);
        assert!(!IronCondor.classify(0.05, &t).profitable);
    }

    #[test]
    fn strategy_kind_dispatches_to_rule() {
        let t = band();
        assert!(StrategyKind::Straddle.classify(0.1, &t).profitable);
        assert!(!StrategyKind::ShortStraddle.classify(0.1, &t).profitable);
        assert!(!StrategyKind::IronCondor.classify(0.1, &t).profitable);
        assert_eq!(StrategyKind::IronCondor.name(), "iron-condor");
    }
}
