//! Outlier filter.
//!
//! Drops windows whose absolute move exceeds the limit. If that would drop
//! every window, the filter becomes a no-op and the unfiltered set is used.

use serde::{Deserialize, Serialize};

use crate::domain::Movement;

/// Largest absolute fractional move kept for aggregation (50%).
pub const OUTLIER_LIMIT: f64 = 0.5;

/// Movements that survive filtering plus bookkeeping about what happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredMovements {
    pub movements: Vec<Movement>,
    /// Windows dropped as outliers (0 when the filter fell back).
    pub removed: usize,
    /// True when every window was an outlier and the raw set was kept.
    pub fell_back: bool,
}

/// Keep movements with `|percent_move| <= limit`.
pub fn filter_outliers(movements: &[Movement], limit: f64) -> FilteredMovements {
    let kept: Vec<Movement> = movements
        .iter()
        .filter(|m| m.abs_move() <= limit)
        .copied()
        .collect();

    if kept.is_empty() && !movements.is_empty() {
        tracing::debug!(
            count = movements.len(),
            limit,
            "every window exceeds the outlier limit; using unfiltered data"
        );
        return FilteredMovements {
            movements: movements.to_vec(),
            removed: 0,
            fell_back: true,
        };
    }

    FilteredMovements {
        removed: movements.len() - kept.len(),
        movements: kept,
        fell_back: false,
    }
}
