//! Automated multi-ticker scans.
//!
//! Each symbol is loaded once and analyzed at every configured horizon
//! with an at-the-money straddle and an estimated premium. The horizon
//! with the highest profitable rate among those meeting the quality floor
//! represents the symbol; when none meets it, the best horizon overall is
//! reported instead. Symbols run on
//! a private rayon pool sized by `max_concurrent`; every pipeline is
//! independent, so no coordination is needed between them.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use straddlelab_core::analysis::{DataQuality, ProfitabilityEngine};
use straddlelab_core::data::{ParquetCache, PriceProvider};

use crate::config::{ScanConfig, StrategyConfig};
use crate::data_loader::{load_series, LoadOptions};
use crate::runner::{run_analysis_from_data, AnalysisResult, RunError};

/// Profitable rate and quality for one horizon of one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonSummary {
    pub horizon_days: usize,
    pub profitable_rate: f64,
    pub data_quality: DataQuality,
}

/// Best horizon for one symbol plus what the others scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolScan {
    pub best: AnalysisResult,
    pub horizons: Vec<HorizonSummary>,
    /// Meets both the rate threshold and the quality floor.
    pub is_candidate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanFailure {
    pub symbol: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResult {
    /// Candidates first, by profitable rate descending.
    pub symbols: Vec<SymbolScan>,
    pub failures: Vec<ScanFailure>,
}

impl ScanResult {
    pub fn candidates(&self) -> impl Iterator<Item = &SymbolScan> {
        self.symbols.iter().filter(|s| s.is_candidate)
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates().count()
    }
}

/// Run a scan over every configured symbol.
///
/// Per-symbol failures are recorded in `failures`; only a failure to start
/// the worker pool aborts the scan.
pub fn run_scan(
    config: &ScanConfig,
    cache: &ParquetCache,
    provider: Option<&dyn PriceProvider>,
    base: &LoadOptions,
) -> Result<ScanResult, RunError> {
    config.validate()?;
    let scan = &config.scan;
    let opts = LoadOptions {
        start: scan.start_date,
        end: scan.end_date,
        ..base.clone()
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(scan.max_concurrent)
        .build()
        .map_err(|e| RunError::ThreadPool(e.to_string()))?;

    tracing::info!(
        symbols = scan.symbols.len(),
        horizons = scan.horizons.len(),
        threads = scan.max_concurrent,
        "starting scan"
    );

    let outcomes: Vec<(String, Result<Option<SymbolScan>, RunError>)> = pool.install(|| {
        scan.symbols
            .par_iter()
            .map(|symbol| (symbol.clone(), scan_symbol(symbol, config, cache, provider, &opts)))
            .collect()
    });

    let mut result = ScanResult::default();
    for (symbol, outcome) in outcomes {
        match outcome {
            Ok(Some(entry)) => result.symbols.push(entry),
            Ok(None) => result.failures.push(ScanFailure {
                symbol,
                error: "not enough history for any horizon".into(),
            }),
            Err(e) => {
                tracing::warn!(%symbol, "scan failed: {e}");
                result.failures.push(ScanFailure {
                    symbol,
                    error: e.to_string(),
                });
            }
        }
    }

    result.symbols.sort_by(|a, b| {
        b.is_candidate.cmp(&a.is_candidate).then(
            b.best
                .report
                .profitable_rate
                .total_cmp(&a.best.report.profitable_rate),
        )
    });

    tracing::info!(
        analyzed = result.symbols.len(),
        candidates = result.candidate_count(),
        failed = result.failures.len(),
        "scan complete"
    );
    Ok(result)
}

/// Analyze one symbol at every horizon and keep the best.
///
/// Horizons below `min_data_quality` only win when no horizon reaches it.
/// Returns `Ok(None)` when no horizon produced a single sample.
fn scan_symbol(
    symbol: &str,
    config: &ScanConfig,
    cache: &ParquetCache,
    provider: Option<&dyn PriceProvider>,
    opts: &LoadOptions,
) -> Result<Option<SymbolScan>, RunError> {
    let scan = &config.scan;
    let loaded = load_series(symbol, cache, provider, None, opts)?;
    let engine = ProfitabilityEngine::default();
    let strategy = StrategyConfig::at_the_money(scan.strategy);

    let mut horizons = Vec::with_capacity(scan.horizons.len());
    let mut best: Option<AnalysisResult> = None;
    let mut best_qualified: Option<AnalysisResult> = None;

    for &horizon_days in &scan.horizons {
        let result = run_analysis_from_data(&loaded, horizon_days, &strategy, &engine)?;
        horizons.push(HorizonSummary {
            horizon_days,
            profitable_rate: result.report.profitable_rate,
            data_quality: result.report.data_quality,
        });
        if result.report.data_quality == DataQuality::None {
            continue;
        }
        if result.report.data_quality >= scan.min_data_quality
            && beats(&result, best_qualified.as_ref())
        {
            best_qualified = Some(result.clone());
        }
        if beats(&result, best.as_ref()) {
            best = Some(result);
        }
    }

    Ok(best_qualified.or(best).map(|best| {
        let is_candidate = best.report.data_quality >= scan.min_data_quality
            && best.report.profitable_rate >= scan.profitable_threshold;
        tracing::debug!(
            symbol,
            horizon_days = best.report.horizon_days,
            profitable_rate = best.report.profitable_rate,
            is_candidate,
            "best horizon"
        );
        SymbolScan {
            best,
            horizons,
            is_candidate,
        }
    }))
}

fn beats(result: &AnalysisResult, current: Option<&AnalysisResult>) -> bool {
    current.map_or(true, |b| result.report.profitable_rate > b.report.profitable_rate)
}
