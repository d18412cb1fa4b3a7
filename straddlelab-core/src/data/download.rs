//! Download orchestrator: fetch → ingest → cache for a list of symbols.

use super::cache::{CoverageResult, ParquetCache};
use super::ingest;
use super::provider::{DataError, DownloadProgress, PriceProvider};
use chrono::NaiveDate;

/// Download several symbols sequentially, stopping early once the provider
/// becomes unavailable.
pub fn download_symbols(
    provider: &dyn PriceProvider,
    cache: &ParquetCache,
    symbols: &[&str],
    start: NaiveDate,
    end: NaiveDate,
    force: bool,
    progress: &dyn DownloadProgress,
) -> DownloadSummary {
    let total = symbols.len();
    let mut succeeded = 0;
    let mut errors: Vec<(String, DataError)> = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);

        if !force && cache.covers_range(symbol, start, end) == CoverageResult::FullyCovered {
            progress.on_complete(symbol, i, total, &Ok(()));
            succeeded += 1;
            continue;
        }

        let result = download_single(provider, cache, symbol, start, end);
        progress.on_complete(symbol, i, total, &result);
        match result {
            Ok(()) => succeeded += 1,
            Err(e) => errors.push((symbol.to_string(), e)),
        }

        if !provider.is_available() {
            for sym in &symbols[(i + 1)..] {
                errors.push((sym.to_string(), DataError::CircuitBreakerTripped));
            }
            break;
        }
    }

    let failed = errors.len();
    progress.on_batch_complete(succeeded, failed, total);

    DownloadSummary {
        total,
        succeeded,
        failed,
        errors,
    }
}

/// Fetch, ingest and cache a single symbol.
pub fn download_single(
    provider: &dyn PriceProvider,
    cache: &ParquetCache,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), DataError> {
    let fetched = provider.fetch(symbol, start, end)?;
    let source = fetched.source;
    let ingested = ingest::ingest(fetched.points)?;
    cache.write(symbol, &ingested.points, source)?;
    Ok(())
}

#[derive(Debug)]
pub struct DownloadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<(String, DataError)>,
}

impl DownloadSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
