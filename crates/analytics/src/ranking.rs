//! Best Combinations

use serde::Serialize;
use std::collections::HashMap;
use storage::{Catalog, Component, SensorCombination};

pub const DEFAULT_BEST_LIMIT: usize = 10;
pub const MAX_BEST_LIMIT: usize = 100;

/// A combination joined with its component names
#[derive(Debug, Clone, Serialize)]
pub struct RankedCombination {
    /// 1-based position
    pub rank: usize,
    #[serde(flatten)]
    pub combination: SensorCombination,
    pub ta_name: Option<String>,
    pub bre_name: Option<String>,
    pub im_name: Option<String>,
    pub mem_name: Option<String>,
}

fn names<C: Component>(items: &[C]) -> HashMap<&str, &str> {
    items.iter().map(|c| (c.id(), c.name())).collect()
}

fn lookup(map: &HashMap<&str, &str>, id: &str) -> Option<String> {
    map.get(id).map(|name| name.to_string())
}

/// Highest-scoring combinations first; ties broken by identifier
pub fn best_combinations(
    catalog: &Catalog,
    combinations: &[SensorCombination],
    limit: usize,
) -> Vec<RankedCombination> {
    let analytes = names(&catalog.analytes);
    let bio = names(&catalog.bio_recognition);
    let immobilization = names(&catalog.immobilization);
    let memristive = names(&catalog.memristive);

    let mut ranked: Vec<&SensorCombination> = combinations.iter().collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.combination_id.cmp(&b.combination_id))
    });

    ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, c)| RankedCombination {
            rank: i + 1,
            ta_name: lookup(&analytes, &c.ta_id),
            bre_name: lookup(&bio, &c.bre_id),
            im_name: lookup(&immobilization, &c.im_id),
            mem_name: lookup(&memristive, &c.mem_id),
            combination: c.clone(),
        })
        .collect()
}
