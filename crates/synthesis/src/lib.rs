//! Combination Synthesis
//!
//! Enumerates untried (TA, BRE, IM, MEM) tuples, scores each with a
//! weighted compatibility heuristic and persists the new combinations.

mod scoring;
mod service;
mod synthesizer;

pub use scoring::{sample_noise, ScoreBreakdown, NOISE_RANGE};
pub use service::{ManualCombination, SynthesisConfig, SynthesisReport, SynthesisService};
pub use synthesizer::{combination_id, next_sequence, synthesize, SynthesisOutcome};

use storage::{ComponentKind, StorageError};
use thiserror::Error;

/// Hard cap on tuples examined by a single synthesis run
pub const DEFAULT_HARD_CAP: usize = 5000;

/// Errors during synthesis or manual combination entry
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Unknown {kind} '{id}'")]
    UnknownComponent { kind: ComponentKind, id: String },
    #[error("Combination {0} already exists")]
    Duplicate(String),
}
