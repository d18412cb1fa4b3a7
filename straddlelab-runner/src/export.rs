//! Export: caller-facing JSON and CSV.
//!
//! JSON uses the strategy-specific camelCase field names consumers expect:
//! - straddles: `aboveUpper`, `belowLower`, `totalProfitable`, ...
//! - iron condors: `inProfitZone`, `aboveUpperBreakeven`, `maxLossProbability`, ...
//! - short straddles: the iron-condor buckets plus `lossRate` and `strategyInsight`
//!
//! Every document carries `estimated` so results built on synthetic data
//! or an estimated premium are never mistaken for real backtests.

use anyhow::{Context, Result};
use serde::Serialize;

use straddlelab_core::analysis::{DataQuality, ProfitabilityReport};
use straddlelab_core::domain::StrategyKind;

use crate::runner::AnalysisResult;
use crate::scan::ScanResult;

/// Fields shared by every strategy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonFields {
    pub total_samples: usize,
    pub profitable_rate: f64,
    pub upper_breakeven_pct: f64,
    pub lower_breakeven_pct: f64,
    pub avg_move: f64,
    pub max_move: f64,
    pub min_move: f64,
    pub data_quality: DataQuality,
    pub estimated: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StrategyFields {
    #[serde(rename_all = "camelCase")]
    Straddle {
        above_upper: usize,
        below_lower: usize,
        total_profitable: usize,
        above_upper_pct: f64,
        below_lower_pct: f64,
    },
    #[serde(rename_all = "camelCase")]
    IronCondor {
        in_profit_zone: usize,
        above_upper_breakeven: usize,
        below_lower_breakeven: usize,
        max_profit_probability: f64,
        max_loss_probability: f64,
    },
    #[serde(rename_all = "camelCase")]
    ShortStraddle {
        in_profit_zone: usize,
        above_upper_breakeven: usize,
        below_lower_breakeven: usize,
        profitable_moves: usize,
        loss_rate: f64,
        strategy_insight: &'static str,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisJson {
    #[serde(flatten)]
    pub strategy: StrategyFields,
    #[serde(flatten)]
    pub common: CommonFields,
}

/// Top-level export document for one analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisExport {
    pub ticker: String,
    pub strategy: StrategyKind,
    pub current_price: f64,
    pub days_to_expiration: usize,
    pub upper_breakeven: f64,
    pub lower_breakeven: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_premium: Option<f64>,
    pub analysis: AnalysisJson,
}

/// One-line guidance for a short straddle's profitable rate.
pub fn strategy_insight(profitable_rate: f64) -> &'static str {
    if profitable_rate > 70.0 {
        "Conservative premium collection with good profit probability"
    } else if profitable_rate > 50.0 {
        "Moderate premium collection strategy"
    } else if profitable_rate > 30.0 {
        "Higher risk premium collection, consider closer strike management"
    } else {
        "High risk strategy - manage carefully and consider position sizing"
    }
}

pub fn analysis_json(report: &ProfitabilityReport, estimated: bool) -> AnalysisJson {
    let b = &report.buckets;
    let strategy = match report.strategy {
        StrategyKind::Straddle => StrategyFields::Straddle {
            above_upper: b.above_upper,
            below_lower: b.below_lower,
            total_profitable: report.profitable_count,
            above_upper_pct: report.bucket_rate(b.above_upper),
            below_lower_pct: report.bucket_rate(b.below_lower),
        },
        StrategyKind::IronCondor => StrategyFields::IronCondor {
            in_profit_zone: b.between,
            above_upper_breakeven: b.above_upper,
            below_lower_breakeven: b.below_lower,
            max_profit_probability: report.profitable_rate,
            max_loss_probability: report.loss_rate,
        },
        StrategyKind::ShortStraddle => StrategyFields::ShortStraddle {
            in_profit_zone: b.between,
            above_upper_breakeven: b.above_upper,
            below_lower_breakeven: b.below_lower,
            profitable_moves: report.profitable_count,
            loss_rate: report.loss_rate,
            strategy_insight: strategy_insight(report.profitable_rate),
        },
    };

    AnalysisJson {
        strategy,
        common: CommonFields {
            total_samples: report.total_samples,
            profitable_rate: report.profitable_rate,
            upper_breakeven_pct: report.upper_breakeven_pct,
            lower_breakeven_pct: report.lower_breakeven_pct,
            avg_move: report.avg_abs_move,
            max_move: report.max_abs_move,
            min_move: report.min_abs_move,
            data_quality: report.data_quality,
            estimated,
        },
    }
}

pub fn analysis_export(result: &AnalysisResult) -> AnalysisExport {
    AnalysisExport {
        ticker: result.symbol.clone(),
        strategy: result.report.strategy,
        current_price: result.reference_price,
        days_to_expiration: result.report.horizon_days,
        upper_breakeven: result.breakevens.upper_price,
        lower_breakeven: result.breakevens.lower_price,
        total_premium: result.premium,
        analysis: analysis_json(&result.report, result.is_estimated()),
    }
}

/// Serialize one analysis to pretty JSON.
pub fn export_json(result: &AnalysisResult) -> Result<String> {
    serde_json::to_string_pretty(&analysis_export(result))
        .context("failed to serialize analysis to JSON")
}

/// Serialize a scan to pretty JSON: candidates, then every analyzed
/// symbol, then failures.
pub fn export_scan_json(scan: &ScanResult) -> Result<String> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct ScanExport<'a> {
        candidates: Vec<AnalysisExport>,
        analyzed: Vec<AnalysisExport>,
        failures: &'a [crate::scan::ScanFailure],
    }

    let doc = ScanExport {
        candidates: scan.candidates().map(|s| analysis_export(&s.best)).collect(),
        analyzed: scan.symbols.iter().map(|s| analysis_export(&s.best)).collect(),
        failures: &scan.failures,
    };
    serde_json::to_string_pretty(&doc).context("failed to serialize scan to JSON")
}

/// Export scan results as CSV, one row per analyzed symbol.
///
/// Columns: ticker, strategy, days_to_expiration, current_price, premium,
/// upper_breakeven_pct, lower_breakeven_pct, profitable_rate, total_samples,
/// data_quality, candidate, estimated
pub fn export_scan_csv(scan: &ScanResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "ticker",
        "strategy",
        "days_to_expiration",
        "current_price",
        "premium",
        "upper_breakeven_pct",
        "lower_breakeven_pct",
        "profitable_rate",
        "total_samples",
        "data_quality",
        "candidate",
        "estimated",
    ])?;

    for entry in &scan.symbols {
        let r = &entry.best;
        wtr.write_record([
            r.symbol.clone(),
            r.report.strategy.to_string(),
            r.report.horizon_days.to_string(),
            format!("{:.2}", r.reference_price),
            r.premium.map(|p| format!("{p:.2}")).unwrap_or_default(),
            format!("{:.2}", r.report.upper_breakeven_pct),
            format!("{:.2}", r.report.lower_breakeven_pct),
            format!("{:.2}", r.report.profitable_rate),
            r.report.total_samples.to_string(),
            r.report.data_quality.to_string(),
            entry.is_candidate.to_string(),
            r.is_estimated().to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}
