//! Breakeven derivation from option legs.
//!
//! Turns strikes, premiums and credits into the fractional thresholds the
//! engine consumes, plus the dollar breakevens shown next to them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{BreakevenThresholds, StrategyKind, ThresholdError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BreakevenError {
    #[error("strike must be positive, got {0}")]
    InvalidStrike(f64),

    #[error("premium must be positive, got {0}")]
    InvalidPremium(f64),

    #[error(
        "invalid iron condor strikes: need long put < short put <= short call < long call \
         (got {long_put} / {short_put} / {short_call} / {long_call})"
    )]
    InvalidCondorStrikes {
        long_put: f64,
        short_put: f64,
        short_call: f64,
        long_call: f64,
    },

    #[error(transparent)]
    Thresholds(#[from] ThresholdError),
}

/// One call and one put at the same strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StraddleLegs {
    pub strike: f64,
    /// Combined call + put premium per share.
    pub premium: f64,
    /// Reference price for the fractional thresholds; the strike is used
    /// when absent.
    pub current_price: Option<f64>,
}

/// The four legs of an iron condor plus the net premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IronCondorLegs {
    pub long_put: f64,
    pub short_put: f64,
    pub short_call: f64,
    pub long_call: f64,
    pub credit: f64,
    pub debit: f64,
    /// Reference price for the fractional thresholds; the short call strike
    /// is used when absent.
    pub current_price: Option<f64>,
}

/// Thresholds plus the price levels they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakevens {
    pub strategy: StrategyKind,
    pub reference_price: f64,
    pub upper_price: f64,
    pub lower_price: f64,
    pub thresholds: BreakevenThresholds,
}

impl StraddleLegs {
    /// Breakevens at `strike ± premium`, expressed relative to the reference
    /// price, since windows measure moves from the current price.
    ///
    /// `strategy` selects long or short labeling; the levels are identical.
    pub fn breakevens(&self, strategy: StrategyKind) -> Result<Breakevens, BreakevenError> {
        if !(self.strike.is_finite() && self.strike > 0.0) {
            return Err(BreakevenError::InvalidStrike(self.strike));
        }
        if !(self.premium.is_finite() && self.premium > 0.0) {
            return Err(BreakevenError::InvalidPremium(self.premium));
        }

        let reference = self
            .current_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or(self.strike);
        let upper_price = self.strike + self.premium;
        let lower_price = self.strike - self.premium;
        let thresholds = BreakevenThresholds::new(
            (upper_price - reference) / reference,
            (lower_price - reference) / reference,
        )?;

        Ok(Breakevens {
            strategy,
            reference_price: reference,
            upper_price,
            lower_price,
            thresholds,
        })
    }
}

impl IronCondorLegs {
    pub fn net_credit(&self) -> f64 {
        self.credit - self.debit
    }

    fn validate(&self) -> Result<(), BreakevenError> {
        let strikes = [self.long_put, self.short_put, self.short_call, self.long_call];
        let ordered = self.long_put < self.short_put
            && self.short_put <= self.short_call
            && self.short_call < self.long_call;
        if strikes.iter().any(|s| !s.is_finite() || *s <= 0.0) || !ordered {
            return Err(BreakevenError::InvalidCondorStrikes {
                long_put: self.long_put,
                short_put: self.short_put,
                short_call: self.short_call,
                long_call: self.long_call,
            });
        }
        Ok(())
    }

    /// Breakevens at `short_call + net` and `short_put - net`, relative to
    /// the reference price.
    pub fn breakevens(&self) -> Result<Breakevens, BreakevenError> {
        self.validate()?;

        let reference = self
            .current_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or(self.short_call);
        let net = self.net_credit();
        let upper_price = self.short_call + net;
        let lower_price = self.short_put - net;
        let thresholds = BreakevenThresholds::new(
            (upper_price - reference) / reference,
            (lower_price - reference) / reference,
        )?;

        Ok(Breakevens {
            strategy: StrategyKind::IronCondor,
            reference_price: reference,
            upper_price,
            lower_price,
            thresholds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condor() -> IronCondorLegs {
        IronCondorLegs {
            long_put: 90.0,
            short_put: 95.0,
            short_call: 105.0,
            long_call: 110.0,
            credit: 3.0,
            debit: 1.0,
            current_price: Some(100.0),
        }
    }

    #[test]
    fn straddle_breakevens_are_symmetric_around_strike() {
        let b = StraddleLegs { strike: 200.0, premium: 10.0, current_price: None }
            .breakevens(StrategyKind::Straddle)
            .unwrap();
        assert_eq!(b.upper_price, 210.0);
        assert_eq!(b.lower_price, 190.0);
        assert!((b.thresholds.upper_pct() - 0.05).abs() < 1e-12);
        assert!((b.thresholds.lower_pct() + 0.05).abs() < 1e-12);
    }

    #[test]
    fn straddle_rejects_bad_inputs() {
        let bad_strike = StraddleLegs { strike: 0.0, premium: 1.0, current_price: None };
        assert!(matches!(
            bad_strike.breakevens(StrategyKind::Straddle),
            Err(BreakevenError::InvalidStrike(_))
        ));
        let bad_premium = StraddleLegs { strike: 10.0, premium: -1.0, current_price: None };
        assert!(matches!(
            bad_premium.breakevens(StrategyKind::ShortStraddle),
            Err(BreakevenError::InvalidPremium(_))
        ));
    }

    #[test]
    fn straddle_thresholds_are_relative_to_current_price() {
        // strike 90 with the stock at 100: both breakevens sit below spot
        let b = StraddleLegs { strike: 90.0, premium: 5.0, current_price: Some(100.0) }
            .breakevens(StrategyKind::ShortStraddle)
            .unwrap();
        assert_eq!(b.reference_price, 100.0);
        assert_eq!(b.upper_price, 95.0);
        assert_eq!(b.lower_price, 85.0);
        assert!((b.thresholds.upper_pct() + 0.05).abs() < 1e-12);
        assert!((b.thresholds.lower_pct() + 0.15).abs() < 1e-12);
    }

    #[test]
    fn straddle_ignores_non_positive_current_price() {
        let b = StraddleLegs { strike: 50.0, premium: 2.0, current_price: Some(0.0) }
            .breakevens(StrategyKind::Straddle)
            .unwrap();
        assert_eq!(b.reference_price, 50.0);
    }

    #[test]
    fn condor_breakevens_use_net_credit() {
        let b = condor().breakevens().unwrap();
        assert_eq!(b.upper_price, 107.0);
        assert_eq!(b.lower_price, 93.0);
        assert!((b.thresholds.upper_pct() - 0.07).abs() < 1e-12);
        assert!((b.thresholds.lower_pct() + 0.07).abs() < 1e-12);
    }

    #[test]
    fn condor_falls_back_to_short_call_reference() {
        let legs = IronCondorLegs { current_price: None, ..condor() };
        assert_eq!(legs.breakevens().unwrap().reference_price, 105.0);
    }

    #[test]
    fn condor_rejects_misordered_strikes() {
        let legs = IronCondorLegs { short_put: 106.0, ..condor() };
        assert!(matches!(
            legs.breakevens(),
            Err(BreakevenError::InvalidCondorStrikes { .. })
        ));
    }

    #[test]
    fn condor_with_large_debit_can_invert_band() {
        // net = -20 pushes upper below lower
        let legs = IronCondorLegs { credit: 0.0, debit: 20.0, ..condor() };
        assert!(matches!(legs.breakevens(), Err(BreakevenError::Thresholds(_))));
    }
}
