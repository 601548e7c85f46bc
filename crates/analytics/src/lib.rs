//! Combination Analytics
//!
//! Aggregates over the component catalog and the combination collection:
//! database statistics, best-scoring combinations and per-layer comparisons.

mod comparative;
mod ranking;
mod statistics;

pub use comparative::{comparative_analysis, ComparativeAnalysis, ComponentScore, LayerSummary};
pub use ranking::{best_combinations, RankedCombination, DEFAULT_BEST_LIMIT, MAX_BEST_LIMIT};
pub use statistics::{statistics, DatabaseStatistics, HistogramBucket, ScoreSummary};
