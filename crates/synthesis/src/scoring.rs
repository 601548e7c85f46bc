//! Compatibility Scoring
//!
//! Four sub-scores in [0, 1], each weighted to 25 points, plus a uniform
//! perturbation in [0, 10). The analyte only contributes through its pH range.

use rand::Rng;
use serde::Serialize;
use std::ops::Range;
use storage::{BioRecognitionLayer, ImmobilizationLayer, MemristiveLayer, TargetAnalyte};

/// pH span the overlap is measured against
const PH_REFERENCE_SPAN: f64 = 8.0;

/// Sensitivity that earns the full sensitivity sub-score
const SENSITIVITY_CEILING: f64 = 20000.0;

/// Three-year window, in days, summed over three layers
const STABILITY_WINDOW: f64 = 365.0 * 3.0;

/// Points per sub-score
const SUB_SCORE_WEIGHT: f64 = 25.0;

/// Run-to-run perturbation added to every score
pub const NOISE_RANGE: Range<f64> = 0.0..10.0;

/// Deterministic part of a combination's score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Fraction of the reference pH span shared by all four components
    pub ph: f64,
    /// BRE sensitivity against the ceiling, capped at 1
    pub sensitivity: f64,
    /// Mean reproducibility of the three layers as a fraction of 100%
    pub reproducibility: f64,
    /// Summed stability of the three layers as a fraction of the window
    pub stability: f64,
}

impl ScoreBreakdown {
    /// Compute the sub-scores for one tuple
    pub fn compute(
        ta: &TargetAnalyte,
        bre: &BioRecognitionLayer,
        im: &ImmobilizationLayer,
        mem: &MemristiveLayer,
    ) -> Self {
        let ph_low = ta.ph_min.max(bre.ph_min).max(im.ph_min).max(mem.ph_min);
        let ph_high = ta.ph_max.min(bre.ph_max).min(im.ph_max).min(mem.ph_max);
        let ph = (ph_high - ph_low).max(0.0) / PH_REFERENCE_SPAN;

        let sensitivity = (bre.sensitivity as f64 / SENSITIVITY_CEILING).min(1.0);

        let reproducibility =
            (bre.reproducibility + im.reproducibility + mem.reproducibility) as f64 / 300.0;

        let stability = (bre.stability + im.stability + mem.stability) as f64 / STABILITY_WINDOW;

        Self {
            ph,
            sensitivity,
            reproducibility,
            stability,
        }
    }

    /// Weighted sum of the sub-scores, before perturbation
    pub fn weighted(&self) -> f64 {
        (self.ph + self.sensitivity + self.reproducibility + self.stability) * SUB_SCORE_WEIGHT
    }

    /// Final score: weighted sum plus `noise`, rounded to one decimal, in [0, 100]
    pub fn composite(&self, noise: f64) -> f64 {
        let raw = self.weighted() + noise;
        ((raw * 10.0).round() / 10.0).clamp(0.0, 100.0)
    }
}

/// Draw one perturbation from [`NOISE_RANGE`]
pub fn sample_noise<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(NOISE_RANGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use storage::fixtures;

    fn tuple() -> (
        TargetAnalyte,
        BioRecognitionLayer,
        ImmobilizationLayer,
        MemristiveLayer,
    ) {
        (
            fixtures::analyte("TA1"),
            fixtures::bio_recognition("BRE1"),
            fixtures::immobilization("IM1"),
            fixtures::memristive("MEM1"),
        )
    }

    #[test]
    fn test_sub_scores() {
        let (ta, bre, im, mem) = tuple();
        let breakdown = ScoreBreakdown::compute(&ta, &bre, &im, &mem);

        // Overlap is [6, 8] over a reference span of 8.
        assert!((breakdown.ph - 0.25).abs() < 1e-9);
        assert!((breakdown.sensitivity - 0.5).abs() < 1e-9);
        assert!((breakdown.reproducibility - 0.8).abs() < 1e-9);
        assert!((breakdown.stability - 635.0 / 1095.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_ph_scores_zero() {
        let (mut ta, bre, im, mem) = tuple();
        ta.ph_min = 2.0;
        ta.ph_max = 4.0;
        let breakdown = ScoreBreakdown::compute(&ta, &bre, &im, &mem);
        assert_eq!(breakdown.ph, 0.0);
    }

    #[test]
    fn test_sensitivity_capped() {
        let (ta, mut bre, im, mem) = tuple();
        bre.sensitivity = 50_000;
        let breakdown = ScoreBreakdown::compute(&ta, &bre, &im, &mem);
        assert_eq!(breakdown.sensitivity, 1.0);
    }

    #[test]
    fn test_composite_rounds_to_one_decimal() {
        let breakdown = ScoreBreakdown {
            ph: 0.5,
            sensitivity: 0.5,
            reproducibility: 0.5,
            stability: 0.5,
        };
        assert_eq!(breakdown.weighted(), 50.0);
        assert_eq!(breakdown.composite(3.14159), 53.1);
    }

    #[test]
    fn test_composite_clamped() {
        let perfect = ScoreBreakdown {
            ph: 1.0,
            sensitivity: 1.0,
            reproducibility: 1.0,
            stability: 1.0,
        };
        assert_eq!(perfect.composite(9.99), 100.0);

        let empty = ScoreBreakdown {
            ph: 0.0,
            sensitivity: 0.0,
            reproducibility: 0.0,
            stability: 0.0,
        };
        assert_eq!(empty.composite(0.0), 0.0);
    }

    #[test]
    fn test_noise_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let noise = sample_noise(&mut rng);
            assert!(NOISE_RANGE.contains(&noise));
        }
    }
}
