//! StraddleLab CLI: download, import, analyze, scan and cache commands.
//!
//! Commands:
//! - `download`: fetch daily closes from Yahoo Finance and cache as Parquet
//! - `import`: load a `date,close` CSV into the cache
//! - `analyze`: historical profitability of one straddle or iron condor
//! - `scan`: rank many tickers by at-the-money straddle profitability
//! - `cache status`: report cached symbols, date ranges and sizes
//!
//! Logging goes to stderr; set `RUST_LOG` to change the level (default `info`).

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use straddlelab_core::data::{
    download_symbols, CircuitBreaker, LogProgress, ParquetCache, PriceProvider, ResponseCache,
    YahooProvider,
};
use straddlelab_core::domain::StrategyKind;
use straddlelab_runner::config::AnalysisSection;
use straddlelab_runner::{
    export_json, export_scan_csv, export_scan_json, import_csv, run_analysis, run_scan,
    AnalysisConfig, AnalysisResult, LoadOptions, ScanConfig, ScanResult, StrategyConfig,
};

#[derive(Parser)]
#[command(
    name = "straddlelab",
    about = "StraddleLab CLI: historical profitability of straddles and iron condors"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily closes from Yahoo Finance and cache as Parquet.
    Download {
        /// Symbols to download (e.g., SPY QQQ AAPL).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to 5 years ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Force re-download even if cached.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Import a `date,close` CSV into the cache.
    Import {
        /// Path to the CSV file.
        path: PathBuf,

        /// Symbol to cache the closes under.
        #[arg(long)]
        symbol: String,

        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Analyze one position from a TOML config or from flags.
    Analyze {
        /// Path to a TOML config file.
        #[arg(long, conflicts_with = "symbol")]
        config: Option<PathBuf>,

        /// Symbol (required without --config).
        #[arg(long)]
        symbol: Option<String>,

        /// straddle, short-straddle or iron-condor.
        #[arg(long, default_value = "straddle")]
        strategy: StrategyKind,

        /// Days to expiration.
        #[arg(long, default_value_t = 30)]
        horizon: usize,

        /// Start date (YYYY-MM-DD). Defaults to 2 years ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        #[command(flatten)]
        legs: LegArgs,

        /// Write the JSON report here instead of printing a summary.
        #[arg(long)]
        json: Option<PathBuf>,

        #[command(flatten)]
        data: DataArgs,
    },
    /// Scan many tickers from a TOML config.
    Scan {
        /// Path to a TOML scan config.
        #[arg(long)]
        config: PathBuf,

        /// Write the full scan as JSON.
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write one CSV row per analyzed symbol.
        #[arg(long)]
        csv: Option<PathBuf>,

        #[command(flatten)]
        data: DataArgs,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

/// Option legs given on the command line.
#[derive(Args)]
struct LegArgs {
    /// Straddle strike. Defaults to the latest close.
    #[arg(long)]
    strike: Option<f64>,

    /// Straddle premium per share. Estimated when omitted.
    #[arg(long)]
    premium: Option<f64>,

    /// Iron condor long put strike.
    #[arg(long)]
    long_put: Option<f64>,

    /// Iron condor short put strike.
    #[arg(long)]
    short_put: Option<f64>,

    /// Iron condor short call strike.
    #[arg(long)]
    short_call: Option<f64>,

    /// Iron condor long call strike.
    #[arg(long)]
    long_call: Option<f64>,

    /// Iron condor credit received.
    #[arg(long)]
    credit: Option<f64>,

    /// Iron condor debit paid.
    #[arg(long, default_value_t = 0.0)]
    debit: f64,
}

#[derive(Args)]
struct DataArgs {
    /// Offline mode: no network access.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Use synthetic data as fallback. Results are marked estimated.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Re-download even if cached.
    #[arg(long, default_value_t = false)]
    force: bool,

    /// Cache directory. Defaults to ./data.
    #[arg(long, default_value = "data")]
    cache_dir: PathBuf,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cached symbols, date ranges and sizes.
    Status {
        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Download {
            symbols,
            start,
            end,
            force,
            cache_dir,
        } => run_download(symbols, start, end, force, cache_dir),
        Commands::Import {
            path,
            symbol,
            cache_dir,
        } => run_import(&path, &symbol, &cache_dir),
        Commands::Analyze {
            config,
            symbol,
            strategy,
            horizon,
            start,
            end,
            legs,
            json,
            data,
        } => {
            let config = match config {
                Some(path) => AnalysisConfig::from_file(&path)?,
                None => build_config_from_flags(
                    symbol,
                    strategy,
                    horizon,
                    start.as_deref(),
                    end.as_deref(),
                    &legs,
                )?,
            };
            run_analyze_cmd(&config, json.as_deref(), &data)
        }
        Commands::Scan {
            config,
            json,
            csv,
            data,
        } => run_scan_cmd(&config, json.as_deref(), csv.as_deref(), &data),
        Commands::Cache { action } => match action {
            CacheAction::Status { cache_dir } => run_cache_status(&cache_dir),
        },
    }
}

fn parse_date(s: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    s.map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("dates must be YYYY-MM-DD")
        .map(|d| d.unwrap_or(default))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn yahoo_provider() -> Result<YahooProvider> {
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    let responses = Arc::new(ResponseCache::default_ttl());
    Ok(YahooProvider::new(circuit_breaker, responses)?)
}

fn run_download(
    symbols: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    force: bool,
    cache_dir: PathBuf,
) -> Result<()> {
    let start_date = parse_date(start.as_deref(), today() - chrono::Duration::days(365 * 5))?;
    let end_date = parse_date(end.as_deref(), today())?;

    let provider = yahoo_provider()?;
    let cache = ParquetCache::new(cache_dir);
    let sym_refs: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();

    let summary = download_symbols(
        &provider,
        &cache,
        &sym_refs,
        start_date,
        end_date,
        force,
        &LogProgress,
    );

    if !summary.all_succeeded() {
        for (sym, err) in &summary.errors {
            tracing::error!("{sym}: {err}");
        }
        bail!("{} of {} downloads failed", summary.failed, summary.total);
    }

    Ok(())
}

fn run_import(path: &Path, symbol: &str, cache_dir: &Path) -> Result<()> {
    let cache = ParquetCache::new(cache_dir);
    let count = import_csv(path, symbol, &cache)?;
    println!("Imported {count} closes for {symbol} into {}", cache_dir.display());
    Ok(())
}

fn build_config_from_flags(
    symbol: Option<String>,
    strategy: StrategyKind,
    horizon: usize,
    start: Option<&str>,
    end: Option<&str>,
    legs: &LegArgs,
) -> Result<AnalysisConfig> {
    let Some(symbol) = symbol else {
        bail!("one of --config or --symbol is required");
    };

    let strategy = match strategy {
        StrategyKind::Straddle => StrategyConfig::Straddle {
            strike: legs.strike,
            premium: legs.premium,
        },
        StrategyKind::ShortStraddle => StrategyConfig::ShortStraddle {
            strike: legs.strike,
            premium: legs.premium,
        },
        StrategyKind::IronCondor => {
            let (Some(long_put), Some(short_put), Some(short_call), Some(long_call), Some(credit)) = (
                legs.long_put,
                legs.short_put,
                legs.short_call,
                legs.long_call,
                legs.credit,
            ) else {
                bail!(
                    "iron-condor needs --long-put, --short-put, --short-call, --long-call and --credit"
                );
            };
            StrategyConfig::IronCondor {
                long_put,
                short_put,
                short_call,
                long_call,
                credit,
                debit: legs.debit,
                current_price: None,
            }
        }
    };

    let config = AnalysisConfig {
        analysis: AnalysisSection {
            symbol,
            start_date: parse_date(start, today() - chrono::Duration::days(365 * 2))?,
            end_date: parse_date(end, today())?,
            horizon_days: horizon,
        },
        strategy,
    };
    config.validate()?;
    Ok(config)
}

fn load_flags(data: &DataArgs) -> LoadOptions {
    LoadOptions {
        start: NaiveDate::MIN,
        end: NaiveDate::MAX,
        offline: data.offline,
        synthetic: data.synthetic,
        force: data.force,
    }
}

fn run_analyze_cmd(config: &AnalysisConfig, json: Option<&Path>, data: &DataArgs) -> Result<()> {
    let cache = ParquetCache::new(&data.cache_dir);
    let provider = if data.offline {
        None
    } else {
        Some(yahoo_provider()?)
    };
    let provider_ref = provider.as_ref().map(|p| p as &dyn PriceProvider);

    let result = run_analysis(config, &cache, provider_ref, &load_flags(data))?;

    match json {
        Some(path) => {
            std::fs::write(path, export_json(&result)?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report saved to: {}", path.display());
        }
        None => print_summary(&result),
    }
    Ok(())
}

fn run_scan_cmd(
    config_path: &Path,
    json: Option<&Path>,
    csv: Option<&Path>,
    data: &DataArgs,
) -> Result<()> {
    let config = ScanConfig::from_file(config_path)?;
    let cache = ParquetCache::new(&data.cache_dir);
    let provider = if data.offline {
        None
    } else {
        Some(yahoo_provider()?)
    };
    let provider_ref = provider.as_ref().map(|p| p as &dyn PriceProvider);

    let result = run_scan(&config, &cache, provider_ref, &load_flags(data))?;
    print_scan(&result, &config);

    if let Some(path) = json {
        std::fs::write(path, export_scan_json(&result)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Scan JSON saved to: {}", path.display());
    }
    if let Some(path) = csv {
        std::fs::write(path, export_scan_csv(&result)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Scan CSV saved to: {}", path.display());
    }
    Ok(())
}

fn run_cache_status(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = ParquetCache::new(cache_dir);
    let symbols = cache.symbols();
    if symbols.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    let sym_refs: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();
    let mut total_size = 0u64;

    println!("Cache: {}", cache_dir.display());
    println!("Symbols: {}", symbols.len());
    println!();
    println!(
        "{:<8} {:<25} {:<10} {:<14} {:>10}",
        "Symbol", "Date Range", "Closes", "Source", "Size"
    );
    println!("{}", "-".repeat(71));
    for status in cache.status(&sym_refs) {
        let size = dir_size(&cache_dir.join(format!("symbol={}", status.symbol)));
        total_size += size;
        let range = match (status.start_date, status.end_date) {
            (Some(s), Some(e)) => format!("{s} to {e}"),
            _ => "(no meta)".into(),
        };
        let closes = status
            .point_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".into());
        let source = status
            .source
            .and_then(|s| serde_json::to_value(s).ok())
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<8} {:<25} {:<10} {:<14} {:>10}",
            status.symbol,
            range,
            closes,
            source,
            format_size(size)
        );
    }
    println!();
    println!("Total size: {}", format_size(total_size));

    Ok(())
}

fn dir_size(path: &Path) -> u64 {
    let mut size = 0u64;
    if let Ok(entries) = std::fs::read_dir(path) {
        for entry in entries.flatten() {
            if let Ok(meta) = entry.metadata() {
                size += meta.len();
            }
        }
    }
    size
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn print_summary(result: &AnalysisResult) {
    let r = &result.report;
    let b = &r.buckets;
    println!();
    println!("=== {} {} ===", result.symbol, r.strategy);
    println!(
        "Price:          {:.2} ({})",
        result.reference_price, result.reference_date
    );
    println!("Horizon:        {} days", r.horizon_days);
    if let Some(premium) = result.premium {
        println!(
            "Premium:        {premium:.2} ({})",
            if result.premium_source.is_estimated() {
                "estimated"
            } else {
                "provided"
            }
        );
    }
    println!(
        "Breakevens:     {:.2} / {:.2}  ({:+.2}% / {:+.2}%)",
        result.breakevens.upper_price,
        result.breakevens.lower_price,
        r.upper_breakeven_pct,
        r.lower_breakeven_pct
    );
    println!();
    println!("--- History ---");
    println!("Samples:        {} ({})", r.total_samples, r.data_quality);
    println!("Profitable:     {:.1}%", r.profitable_rate);
    match r.strategy {
        StrategyKind::Straddle => {
            println!("Above upper:    {}", b.above_upper);
            println!("Below lower:    {}", b.below_lower);
        }
        StrategyKind::ShortStraddle | StrategyKind::IronCondor => {
            println!("In profit zone: {}", b.between);
            println!("Above upper:    {}", b.above_upper);
            println!("Below lower:    {}", b.below_lower);
        }
    }
    println!(
        "Moves:          avg {:.2}%  max {:.2}%  min {:.2}%",
        r.avg_abs_move, r.max_abs_move, r.min_abs_move
    );
    if r.outlier_fallback {
        println!("NOTE: every window exceeded the outlier limit; statistics are unfiltered");
    } else if r.outliers_removed > 0 {
        println!("NOTE: {} outlier window(s) excluded", r.outliers_removed);
    }
    if let Some(hash) = &result.config_hash {
        println!("Config:         {}", &hash[..12]);
    }
    if result.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data (estimated)");
    }
    println!();
}

fn print_scan(result: &ScanResult, config: &ScanConfig) {
    println!();
    println!(
        "=== Scan: {} candidate(s) at >= {:.0}% with {}+ data ===",
        result.candidate_count(),
        config.scan.profitable_threshold,
        config.scan.min_data_quality
    );
    println!(
        "{:<8} {:>5} {:>9} {:>9} {:>8}  {}",
        "Symbol", "Days", "Rate", "Samples", "Quality", ""
    );
    println!("{}", "-".repeat(56));
    for entry in &result.symbols {
        let r = &entry.best.report;
        println!(
            "{:<8} {:>5} {:>8.1}% {:>9} {:>8}  {}",
            entry.best.symbol,
            r.horizon_days,
            r.profitable_rate,
            r.total_samples,
            r.data_quality.as_str(),
            if entry.is_candidate { "*" } else { "" }
        );
    }
    for failure in &result.failures {
        println!("{:<8} failed: {}", failure.symbol, failure.error);
    }
    println!();
}
