//! Price data acquisition and caching.
//!
//! Everything here is I/O plumbing around the engine: it produces the
//! ordered daily closes that `analysis` consumes, and never runs analysis
//! itself.

pub mod cache;
pub mod circuit_breaker;
pub mod download;
pub mod ingest;
pub mod provider;
pub mod response_cache;
pub mod yahoo;

pub use cache::{CacheMeta, CacheStatus, CoverageResult, ParquetCache};
pub use circuit_breaker::CircuitBreaker;
pub use download::{download_symbols, DownloadSummary};
pub use ingest::{ingest, IngestResult};
pub use provider::{
    DataError, DataSource, DownloadProgress, FetchResult, LogProgress, PriceProvider,
};
pub use response_cache::ResponseCache;
pub use yahoo::YahooProvider;
