//! Database Statistics

use serde::Serialize;
use storage::{SensorCombination, TableCounts};

/// Width of each score histogram bucket
const BUCKET_WIDTH: f64 = 20.0;

/// Number of histogram buckets covering [0, 100]
const BUCKETS: usize = 5;

/// Summary statistics of a set of scores
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

impl ScoreSummary {
    /// Compute summary statistics from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Self {
            count: values.len(),
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
            median,
        }
    }
}

/// Number of combinations whose score falls in `[lower, upper)`.
/// The last bucket is closed so that 100 is counted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Database-wide statistics
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatistics {
    pub counts: TableCounts,
    /// Size of the full (TA, BRE, IM, MEM) space
    pub tuple_space: usize,
    /// Fraction of the tuple space already synthesized
    pub coverage: f64,
    pub scores: ScoreSummary,
    pub histogram: Vec<HistogramBucket>,
}

fn histogram(scores: &[f64]) -> Vec<HistogramBucket> {
    let mut buckets: Vec<HistogramBucket> = (0..BUCKETS)
        .map(|i| HistogramBucket {
            lower: i as f64 * BUCKET_WIDTH,
            upper: (i + 1) as f64 * BUCKET_WIDTH,
            count: 0,
        })
        .collect();

    for &score in scores {
        let index = ((score / BUCKET_WIDTH).floor().max(0.0) as usize).min(BUCKETS - 1);
        buckets[index].count += 1;
    }
    buckets
}

/// Compute statistics from table counts and the combination collection
pub fn statistics(counts: TableCounts, combinations: &[SensorCombination]) -> DatabaseStatistics {
    let scores: Vec<f64> = combinations.iter().map(|c| c.score).collect();
    let tuple_space =
        counts.analytes * counts.bio_recognition * counts.immobilization * counts.memristive;
    let coverage = if tuple_space > 0 {
        (counts.combinations as f64 / tuple_space as f64).min(1.0)
    } else {
        0.0
    };

    DatabaseStatistics {
        counts,
        tuple_space,
        coverage,
        scores: ScoreSummary::compute(&scores),
        histogram: histogram(&scores),
    }
}
