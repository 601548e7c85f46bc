//! Cartesian Synthesizer
//!
//! Pure enumeration over a [`Catalog`]: no I/O, the random source and the
//! creation timestamp are supplied by the caller.

use crate::scoring::{sample_noise, ScoreBreakdown};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashSet;
use storage::{Catalog, SensorCombination};
use tracing::debug;

const ID_PREFIX: &str = "SC";

/// Result of one enumeration
#[derive(Debug, Clone, Default)]
pub struct SynthesisOutcome {
    /// Tuples examined, duplicates included
    pub checked: usize,
    /// Newly created combinations, in enumeration order
    pub created: Vec<SensorCombination>,
    /// Enumeration stopped at the cap while tuples remained
    pub truncated: bool,
}

/// Identifier for the `sequence`-th combination
pub fn combination_id(sequence: usize) -> String {
    format!("{}{:06}", ID_PREFIX, sequence)
}

/// Next free sequence number: one past the larger of the collection size
/// and the highest sequence already issued.
pub fn next_sequence(existing: &[SensorCombination]) -> usize {
    let highest = existing
        .iter()
        .filter_map(|c| c.combination_id.strip_prefix(ID_PREFIX))
        .filter_map(|digits| digits.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    highest.max(existing.len()) + 1
}

/// Enumerate TA → BRE → IM → MEM (outer to inner) in catalog order.
///
/// Every examined tuple counts toward `checked`; enumeration stops as soon as
/// `max_checked` tuples have been examined. Tuples already present in
/// `existing` are skipped; every other tuple is scored and created.
pub fn synthesize<R: Rng>(
    catalog: &Catalog,
    existing: &[SensorCombination],
    max_checked: usize,
    rng: &mut R,
    created_at: DateTime<Utc>,
) -> SynthesisOutcome {
    let mut seen: HashSet<(&str, &str, &str, &str)> = existing
        .iter()
        .map(|c| {
            (
                c.ta_id.as_str(),
                c.bre_id.as_str(),
                c.im_id.as_str(),
                c.mem_id.as_str(),
            )
        })
        .collect();

    let mut outcome = SynthesisOutcome::default();
    let mut sequence = next_sequence(existing);

    'enumeration: for ta in &catalog.analytes {
        for bre in &catalog.bio_recognition {
            for im in &catalog.immobilization {
                for mem in &catalog.memristive {
                    if outcome.checked >= max_checked {
                        outcome.truncated = true;
                        break 'enumeration;
                    }
                    outcome.checked += 1;

                    let key = (
                        ta.ta_id.as_str(),
                        bre.bre_id.as_str(),
                        im.im_id.as_str(),
                        mem.mem_id.as_str(),
                    );
                    if !seen.insert(key) {
                        continue;
                    }

                    let score =
                        ScoreBreakdown::compute(ta, bre, im, mem).composite(sample_noise(rng));

                    outcome.created.push(SensorCombination {
                        combination_id: combination_id(sequence),
                        ta_id: ta.ta_id.clone(),
                        bre_id: bre.bre_id.clone(),
                        im_id: im.im_id.clone(),
                        mem_id: mem.mem_id.clone(),
                        score,
                        created_at,
                    });
                    sequence += 1;
                }
            }
        }
    }

    debug!(
        checked = outcome.checked,
        created = outcome.created.len(),
        truncated = outcome.truncated,
        "Enumeration finished"
    );
    outcome
}
