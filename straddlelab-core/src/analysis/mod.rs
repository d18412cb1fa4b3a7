//! The profitability pipeline.
//!
//! Price series → windows → forward returns → outlier filter →
//! payoff classification → report. Every stage is a pure function of its
//! input; the engine holds no state between calls.

pub mod classifier;
pub mod engine;
pub mod outlier;
pub mod report;
pub mod returns;
pub mod window;

pub use classifier::{Classification, IronCondor, LongStraddle, PayoffClassifier, ShortStraddle, Zone};
pub use engine::{analyze_profitability, EngineConfig, ProfitabilityEngine};
pub use outlier::{filter_outliers, FilteredMovements, OUTLIER_LIMIT};
pub use report::{aggregate, BucketCounts, DataQuality, ParseQualityError, ProfitabilityReport};
pub use returns::forward_return;
pub use window::{generate_windows, MAX_WINDOWS};
