//! Close-series loading and data resolution for the runner.
//!
//! Implements the fallback policy:
//! 1. If the cache covers the requested range → use it
//! 2. Otherwise, if a provider is available → download and cache
//! 3. If the download is not possible, a partially covering cache is used
//!    with a warning
//! 4. If no data and `synthetic` → generate a synthetic series (tagged)
//! 5. Otherwise → fail with a clear error
//!
//! Synthetic series keep demos running without network access. Anything
//! computed from them is reported as estimated.

use chrono::{Datelike, NaiveDate};
use std::path::Path;
use thiserror::Error;

use straddlelab_core::data::cache::{hash_points, CoverageResult};
use straddlelab_core::data::{
    ingest, DataError, DataSource, DownloadProgress, ParquetCache, PriceProvider,
};
use straddlelab_core::domain::PricePoint;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(
        "no cached data for '{symbol}' and no network access (use --synthetic for synthetic data)"
    )]
    NoCachedDataOffline { symbol: String },

    #[error("no cached data for '{symbol}' and download failed: {reason}")]
    DownloadFailed { symbol: String, reason: String },

    #[error("failed to read CSV '{path}': {reason}")]
    Csv { path: String, reason: String },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Options controlling how closes are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// If true, never make network requests.
    pub offline: bool,
    /// If true, generate a synthetic series when real data is unavailable.
    pub synthetic: bool,
    /// Force re-download even if cached.
    pub force: bool,
}

/// A loaded close series with provenance.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub symbol: String,
    /// Closes within the requested range, oldest first.
    pub points: Vec<PricePoint>,
    pub source: DataSource,
    pub has_synthetic: bool,
    /// BLAKE3 over dates and closes.
    pub dataset_hash: String,
}

impl LoadedSeries {
    fn new(symbol: &str, points: Vec<PricePoint>, source: DataSource) -> Self {
        Self {
            symbol: symbol.to_string(),
            dataset_hash: hash_points(&points),
            has_synthetic: source == DataSource::Synthetic,
            points,
            source,
        }
    }

    pub fn latest_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }
}

/// Load closes for one symbol, with fallback to download or synthetic.
pub fn load_series(
    symbol: &str,
    cache: &ParquetCache,
    provider: Option<&dyn PriceProvider>,
    progress: Option<&dyn DownloadProgress>,
    opts: &LoadOptions,
) -> Result<LoadedSeries, LoadError> {
    // Step 1: cache
    let mut partial: Option<Vec<PricePoint>> = None;
    if !opts.force {
        match cache.covers_range(symbol, opts.start, opts.end) {
            CoverageResult::FullyCovered => {
                if let Ok(points) = cache.load_range(symbol, opts.start, opts.end) {
                    tracing::debug!(symbol, points = points.len(), "loaded closes from cache");
                    return Ok(LoadedSeries::new(symbol, points, DataSource::Cache));
                }
            }
            CoverageResult::PartiallyCovered {
                cached_start,
                cached_end,
            } => {
                if let Ok(points) = cache.load_range(symbol, opts.start, opts.end) {
                    tracing::warn!(
                        symbol,
                        %cached_start,
                        %cached_end,
                        requested_start = %opts.start,
                        requested_end = %opts.end,
                        "cache only partially covers the requested range"
                    );
                    partial = Some(points);
                }
            }
            CoverageResult::NotCached => {}
        }
    }

    // Step 2: download
    let mut failure: Option<String> = None;
    if !opts.offline {
        if let Some(prov) = provider.filter(|p| p.is_available()) {
            if let Some(p) = progress {
                p.on_start(symbol, 0, 1);
            }
            match prov.fetch(symbol, opts.start, opts.end) {
                Ok(fetched) => {
                    let ingested = ingest(fetched.points)?;
                    cache.write(symbol, &ingested.points, fetched.source)?;
                    if let Some(p) = progress {
                        p.on_complete(symbol, 0, 1, &Ok(()));
                    }
                    return Ok(LoadedSeries::new(symbol, ingested.points, fetched.source));
                }
                Err(e) => {
                    failure = Some(e.to_string());
                    if let Some(p) = progress {
                        p.on_complete(symbol, 0, 1, &Err(e));
                    }
                }
            }
        }
    }

    // Step 3: partial cache
    if let Some(points) = partial {
        tracing::warn!(
            symbol,
            points = points.len(),
            "analyzing partially cached closes"
        );
        return Ok(LoadedSeries::new(symbol, points, DataSource::Cache));
    }

    // Step 4: synthetic fallback
    if opts.synthetic {
        tracing::warn!(
            symbol,
            "generating synthetic closes; results will be reported as estimated"
        );
        let points = generate_synthetic_series(symbol, opts.start, opts.end);
        return Ok(LoadedSeries::new(symbol, points, DataSource::Synthetic));
    }

    // Step 5: fail
    if opts.offline {
        return Err(LoadError::NoCachedDataOffline {
            symbol: symbol.to_string(),
        });
    }
    Err(LoadError::DownloadFailed {
        symbol: symbol.to_string(),
        reason: failure.unwrap_or_else(|| "no price provider available".into()),
    })
}

/// Read a `date,close` CSV, validate it and write it to the cache.
///
/// Dates are `YYYY-MM-DD`. Header names are matched case-insensitively;
/// extra columns are ignored. Returns the number of closes cached.
pub fn import_csv(path: &Path, symbol: &str, cache: &ParquetCache) -> Result<usize, LoadError> {
    let csv_err = |reason: String| LoadError::Csv {
        path: path.display().to_string(),
        reason,
    };

    let mut rdr = csv::Reader::from_path(path).map_err(|e| csv_err(e.to_string()))?;
    let headers = rdr.headers().map_err(|e| csv_err(e.to_string()))?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| csv_err(format!("missing '{name}' column")))
    };
    let date_col = column("date")?;
    let close_col = column("close")?;

    let mut raw = Vec::new();
    let mut unparsable = 0usize;
    for record in rdr.records() {
        let record = record.map_err(|e| csv_err(e.to_string()))?;
        let date = record
            .get(date_col)
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());
        let close = record
            .get(close_col)
            .and_then(|c| c.trim().parse::<f64>().ok());
        match (date, close) {
            (Some(date), Some(close)) => raw.push(PricePoint::new(date, close)),
            _ => unparsable += 1,
        }
    }

    let ingested = ingest(raw)?;
    cache.write(symbol, &ingested.points, DataSource::CsvImport)?;
    tracing::info!(
        symbol,
        rows = ingested.points.len(),
        unparsable,
        invalid = ingested.invalid_dropped,
        duplicates = ingested.duplicates_dropped,
        "imported {}",
        path.display()
    );
    Ok(ingested.points.len())
}

/// Deterministic random walk from 100.0, seeded from the symbol name.
///
/// Weekends are skipped. Daily returns are drawn from ±2%.
pub fn generate_synthetic_series(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut points = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday != chrono::Weekday::Sat && weekday != chrono::Weekday::Sun {
            let daily_return: f64 = rng.gen_range(-0.02..0.02);
            price *= 1.0 + daily_return;
            points.push(PricePoint::new(current, price));
        }
        current += chrono::Duration::days(1);
    }

    points
}
