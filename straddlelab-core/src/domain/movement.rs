//! Movement: one return window over a fixed trading-day horizon.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::price::PricePoint;
use crate::analysis::returns::forward_return;

/// Price move between two closes `horizon` trading days apart.
///
/// Indices refer to positions in the normalized (oldest → newest) series.
/// Both prices are always strictly positive; the window generator never
/// builds a movement from an invalid close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub start_index: usize,
    pub end_index: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_price: f64,
    pub end_price: f64,
    /// Fractional forward move, `(end - start) / start`.
    pub percent_move: f64,
}

impl Movement {
    /// Build a movement from two points of the normalized series.
    ///
    /// Returns `None` when either endpoint is not a valid close.
    pub fn between(
        start_index: usize,
        start: &PricePoint,
        end_index: usize,
        end: &PricePoint,
    ) -> Option<Self> {
        if !start.is_valid() || !end.is_valid() {
            return None;
        }
        Some(Self {
            start_index,
            end_index,
            start_date: start.date,
            end_date: end.date,
            start_price: start.close,
            end_price: end.close,
            percent_move: forward_return(start.close, end.close),
        })
    }

    pub fn abs_move(&self) -> f64 {
        self.percent_move.abs()
    }

    /// Number of trading-day indices the window spans.
    pub fn span(&self) -> usize {
        self.end_index - self.start_index
    }
}
