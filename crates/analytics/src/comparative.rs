//! Comparative Layer Analysis

use serde::Serialize;
use std::collections::HashMap;
use storage::{Catalog, Component, ComponentKind, SensorCombination};
use tracing::debug;

/// Averages over every layer of one kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSummary {
    pub kind: ComponentKind,
    pub count: usize,
    pub mean_reproducibility: f64,
    pub mean_stability: f64,
    pub mean_response_time: f64,
    pub mean_power_consumption: f64,
    /// Immobilization layers carry no sensitivity
    pub mean_sensitivity: Option<f64>,
}

/// How one component fares across the combinations that use it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentScore {
    pub kind: ComponentKind,
    pub id: String,
    pub name: String,
    pub combinations: usize,
    /// `None` when no combination uses the component yet
    pub mean_score: Option<f64>,
}

/// Side-by-side comparison of layer kinds and individual components
#[derive(Debug, Clone, Serialize)]
pub struct ComparativeAnalysis {
    pub layers: Vec<LayerSummary>,
    /// Best mean score first; unused components last
    pub components: Vec<ComponentScore>,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Running (sum, count) per component id
type Tally<'a> = HashMap<&'a str, (f64, usize)>;

fn tally<'a>(
    combinations: &'a [SensorCombination],
    id_of: impl Fn(&'a SensorCombination) -> &'a str,
) -> Tally<'a> {
    let mut tally = Tally::new();
    for c in combinations {
        let entry = tally.entry(id_of(c)).or_insert((0.0, 0));
        entry.0 += c.score;
        entry.1 += 1;
    }
    tally
}

fn component_scores<C: Component>(items: &[C], tally: &Tally<'_>) -> Vec<ComponentScore> {
    items
        .iter()
        .map(|item| {
            let (sum, n) = tally.get(item.id()).copied().unwrap_or((0.0, 0));
            ComponentScore {
                kind: C::KIND,
                id: item.id().to_string(),
                name: item.name().to_string(),
                combinations: n,
                mean_score: (n > 0).then(|| sum / n as f64),
            }
        })
        .collect()
}

/// Compare layer kinds and rank components by the scores of their combinations
pub fn comparative_analysis(
    catalog: &Catalog,
    combinations: &[SensorCombination],
) -> ComparativeAnalysis {
    let bre = &catalog.bio_recognition;
    let im = &catalog.immobilization;
    let mem = &catalog.memristive;

    let layers = vec![
        LayerSummary {
            kind: ComponentKind::BioRecognition,
            count: bre.len(),
            mean_reproducibility: mean(bre.iter().map(|l| l.reproducibility as f64)),
            mean_stability: mean(bre.iter().map(|l| l.stability as f64)),
            mean_response_time: mean(bre.iter().map(|l| l.response_time as f64)),
            mean_power_consumption: mean(bre.iter().map(|l| l.power_consumption as f64)),
            mean_sensitivity: Some(mean(bre.iter().map(|l| l.sensitivity as f64))),
        },
        LayerSummary {
            kind: ComponentKind::Immobilization,
            count: im.len(),
            mean_reproducibility: mean(im.iter().map(|l| l.reproducibility as f64)),
            mean_stability: mean(im.iter().map(|l| l.stability as f64)),
            mean_response_time: mean(im.iter().map(|l| l.response_time as f64)),
            mean_power_consumption: mean(im.iter().map(|l| l.power_consumption as f64)),
            mean_sensitivity: None,
        },
        LayerSummary {
            kind: ComponentKind::Memristive,
            count: mem.len(),
            mean_reproducibility: mean(mem.iter().map(|l| l.reproducibility as f64)),
            mean_stability: mean(mem.iter().map(|l| l.stability as f64)),
            mean_response_time: mean(mem.iter().map(|l| l.response_time as f64)),
            mean_power_consumption: mean(mem.iter().map(|l| l.power_consumption as f64)),
            mean_sensitivity: Some(mean(mem.iter().map(|l| l.sensitivity as f64))),
        },
    ];

    let mut components = Vec::new();
    components.extend(component_scores(
        &catalog.analytes,
        &tally(combinations, |c| c.ta_id.as_str()),
    ));
    components.extend(component_scores(bre, &tally(combinations, |c| c.bre_id.as_str())));
    components.extend(component_scores(im, &tally(combinations, |c| c.im_id.as_str())));
    components.extend(component_scores(mem, &tally(combinations, |c| c.mem_id.as_str())));

    components.sort_by(|a, b| match (a.mean_score, b.mean_score) {
        (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    });

    debug!(components = components.len(), "Comparative analysis computed");
    ComparativeAnalysis { layers, components }
}
