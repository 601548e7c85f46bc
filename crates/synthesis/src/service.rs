//! Repository-backed Synthesis Service

use crate::scoring::{sample_noise, ScoreBreakdown};
use crate::synthesizer::{combination_id, next_sequence, synthesize};
use crate::{SynthesisError, DEFAULT_HARD_CAP};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use storage::{Component, Page, Repository, SensorCombination};
use tracing::{info, warn};

/// Synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Upper bound on tuples examined per run, whatever the caller requests
    pub hard_cap: usize,
    /// Fixed RNG seed for reproducible scores; entropy when unset
    pub seed: Option<u64>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            hard_cap: DEFAULT_HARD_CAP,
            seed: None,
        }
    }
}

/// Summary of one synthesis run
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisReport {
    pub checked: usize,
    pub created: usize,
    /// More untried tuples may exist beyond this run
    pub truncated: bool,
    /// Effective cap applied to this run
    pub max_checked: usize,
    /// The persisted combinations
    pub combinations: Vec<SensorCombination>,
}

/// Manually entered combination
#[derive(Debug, Clone, Deserialize)]
pub struct ManualCombination {
    pub ta_id: String,
    pub bre_id: String,
    pub im_id: String,
    pub mem_id: String,
}

/// Runs synthesis against a repository.
///
/// Runs and manual entries are serialized, so two concurrent requests can
/// never both admit the same tuple.
pub struct SynthesisService {
    repository: Arc<dyn Repository>,
    config: SynthesisConfig,
    rng: Mutex<StdRng>,
    run_lock: tokio::sync::Mutex<()>,
}

impl SynthesisService {
    /// Create a new synthesis service
    pub fn new(repository: Arc<dyn Repository>, config: SynthesisConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(
            hard_cap = config.hard_cap,
            seeded = config.seed.is_some(),
            "Creating synthesis service"
        );
        Self {
            repository,
            config,
            rng: Mutex::new(rng),
            run_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Cap actually applied for a requested maximum
    pub fn effective_cap(&self, requested: usize) -> usize {
        requested.clamp(1, self.config.hard_cap.max(1))
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        // A panic mid-draw leaves the generator in a usable state.
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Synthesize and persist every untried tuple, up to the effective cap
    pub async fn run(&self, requested: usize) -> Result<SynthesisReport, SynthesisError> {
        let _guard = self.run_lock.lock().await;
        let max_checked = self.effective_cap(requested);

        let catalog = self.repository.load_catalog().await?;
        let existing = self.repository.list_combinations(Page::all()).await?;

        let outcome = {
            let mut rng = self.rng();
            synthesize(&catalog, &existing, max_checked, &mut *rng, Utc::now())
        };

        if !outcome.created.is_empty() {
            self.repository
                .create_combinations(outcome.created.clone())
                .await?;
        }

        if outcome.truncated {
            warn!(
                max_checked,
                space = catalog.tuple_space(),
                "Synthesis stopped at cap; more combinations may exist"
            );
        }
        info!(
            checked = outcome.checked,
            created = outcome.created.len(),
            "Synthesis run complete"
        );

        Ok(SynthesisReport {
            checked: outcome.checked,
            created: outcome.created.len(),
            truncated: outcome.truncated,
            max_checked,
            combinations: outcome.created,
        })
    }

    /// Score and store a single, caller-chosen tuple
    pub async fn add_manual(
        &self,
        request: ManualCombination,
    ) -> Result<SensorCombination, SynthesisError> {
        let _guard = self.run_lock.lock().await;

        let catalog = self.repository.load_catalog().await?;
        let ta = find(&catalog.analytes, &request.ta_id)?;
        let bre = find(&catalog.bio_recognition, &request.bre_id)?;
        let im = find(&catalog.immobilization, &request.im_id)?;
        let mem = find(&catalog.memristive, &request.mem_id)?;

        let existing = self.repository.list_combinations(Page::all()).await?;
        let duplicate = existing.iter().any(|c| {
            c.ta_id == request.ta_id
                && c.bre_id == request.bre_id
                && c.im_id == request.im_id
                && c.mem_id == request.mem_id
        });
        if duplicate {
            return Err(SynthesisError::Duplicate(format!(
                "{}/{}/{}/{}",
                request.ta_id, request.bre_id, request.im_id, request.mem_id
            )));
        }

        let noise = sample_noise(&mut *self.rng());
        let combination = SensorCombination {
            combination_id: combination_id(next_sequence(&existing)),
            ta_id: request.ta_id,
            bre_id: request.bre_id,
            im_id: request.im_id,
            mem_id: request.mem_id,
            score: ScoreBreakdown::compute(ta, bre, im, mem).composite(noise),
            created_at: Utc::now(),
        };

        self.repository
            .create_combinations(vec![combination.clone()])
            .await?;
        info!(
            id = %combination.combination_id,
            score = combination.score,
            "Manual combination stored"
        );
        Ok(combination)
    }
}

fn find<'a, C: Component>(items: &'a [C], id: &str) -> Result<&'a C, SynthesisError> {
    items
        .iter()
        .find(|c| c.id() == id)
        .ok_or_else(|| SynthesisError::UnknownComponent {
            kind: C::KIND,
            id: id.to_string(),
        })
}
