//! Window generation.
//!
//! Slices a normalized (oldest → newest) series into non-overlapping return
//! windows of exactly `horizon_days` trading-day indices. Iteration starts at
//! the newest close and steps backward by the horizon, so the most recent
//! window is always anchored on the latest data point.

use crate::domain::{Movement, PricePoint};

/// Upper bound on windows produced for a single series.
pub const MAX_WINDOWS: usize = 200;

/// Produce non-overlapping windows, newest first.
///
/// - Fewer than `horizon_days + 1` points, or a zero horizon, yields no
///   windows. Insufficient data is a degenerate case, not an error.
/// - When either endpoint of a candidate window is not a valid close, the
///   candidate is skipped and the cursor moves back by one index instead of
///   a full horizon. Alignment of every older window shifts accordingly.
/// - At most `max_windows` windows are returned.
pub fn generate_windows(
    series: &[PricePoint],
    horizon_days: usize,
    max_windows: usize,
) -> Vec<Movement> {
    let mut windows = Vec::new();
    if horizon_days == 0 || series.len() < horizon_days + 1 {
        return windows;
    }

    let mut cursor = series.len() - 1;
    while cursor >= horizon_days && windows.len() < max_windows {
        let start = cursor - horizon_days;
        match Movement::between(start, &series[start], cursor, &series[cursor]) {
            Some(movement) => {
                windows.push(movement);
                cursor -= horizon_days;
            }
            None => {
                tracing::debug!(
                    start_date = %series[start].date,
                    end_date = %series[cursor].date,
                    "skipping window with invalid close"
                );
                cursor -= 1;
            }
        }
    }

    windows
}
