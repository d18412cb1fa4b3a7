//! Return calculation.
//!
//! One sign convention for every flow: the forward move from the
//! chronologically older close to the newer one. Positive values are
//! up-moves and are compared against the upper breakeven.

/// `(later - earlier) / earlier`.
///
/// Callers guarantee `earlier > 0`; the window generator never pairs an
/// invalid close.
#[inline]
pub fn forward_return(earlier: f64, later: f64) -> f64 {
    (later - earlier) / earlier
}
