//! Ingest pipeline: validate and order raw closes before they are cached.

use super::provider::DataError;
use crate::domain::PricePoint;

/// Cleaned closes plus what was dropped along the way.
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub points: Vec<PricePoint>,
    /// Non-finite or non-positive closes removed.
    pub invalid_dropped: usize,
    /// Repeated dates collapsed (last value wins).
    pub duplicates_dropped: usize,
}

/// Sort ascending, drop invalid closes, collapse duplicate dates.
pub fn ingest(raw: Vec<PricePoint>) -> Result<IngestResult, DataError> {
    let total = raw.len();
    let mut points: Vec<PricePoint> = raw.into_iter().filter(PricePoint::is_valid).collect();
    let invalid_dropped = total - points.len();

    points.sort_by_key(|p| p.date);

    let before_dedup = points.len();
    let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match deduped.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => deduped.push(point),
        }
    }
    let duplicates_dropped = before_dedup - deduped.len();

    if deduped.is_empty() {
        return Err(DataError::ValidationError(format!(
            "no valid closes among {total} rows"
        )));
    }
    if invalid_dropped > 0 || duplicates_dropped > 0 {
        tracing::warn!(invalid_dropped, duplicates_dropped, "ingest dropped rows");
    }

    Ok(IngestResult {
        points: deduped,
        invalid_dropped,
        duplicates_dropped,
    })
}
