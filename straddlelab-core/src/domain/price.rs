//! PricePoint: one daily close, the only market data the engine consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily closing price for a single symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }

    /// A close usable as a window endpoint: finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// Return the series ordered oldest → newest.
///
/// Loaders hand over either ordering. The sort is stable, so points sharing a
/// date keep their relative input order.
pub fn normalize_series(series: &[PricePoint]) -> Vec<PricePoint> {
    let mut sorted = series.to_vec();
    if !sorted.windows(2).all(|w| w[0].date <= w[1].date) {
        sorted.sort_by_key(|p| p.date);
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn descending_series_is_reversed() {
        let series = vec![
            PricePoint::new(day(4), 103.0),
            PricePoint::new(day(3), 102.0),
            PricePoint::new(day(2), 101.0),
        ];
        let sorted = normalize_series(&series);
        assert_eq!(sorted[0].date, day(2));
        assert_eq!(sorted[2].close, 103.0);
    }

    #[test]
    fn ascending_series_is_untouched() {
        let series = vec![PricePoint::new(day(2), 1.0), PricePoint::new(day(3), 2.0)];
        assert_eq!(normalize_series(&series), series);
    }

    #[test]
    fn validity_rejects_zero_negative_and_nan() {
        assert!(PricePoint::new(day(2), 10.0).is_valid());
        assert!(!PricePoint::new(day(2), 0.0).is_valid());
        assert!(!PricePoint::new(day(2), -1.0).is_valid());
        assert!(!PricePoint::new(day(2), f64::NAN).is_valid());
    }
}
