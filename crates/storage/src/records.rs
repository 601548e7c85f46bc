//! Component and Combination Records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four kinds of biosensor component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Target analyte
    Analyte,
    /// Bio-recognition layer
    BioRecognition,
    /// Immobilization layer
    Immobilization,
    /// Memristive layer
    Memristive,
}

impl ComponentKind {
    /// All kinds in tuple order (TA, BRE, IM, MEM)
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Analyte,
        ComponentKind::BioRecognition,
        ComponentKind::Immobilization,
        ComponentKind::Memristive,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Analyte => "analyte",
            ComponentKind::BioRecognition => "bio_recognition",
            ComponentKind::Immobilization => "immobilization",
            ComponentKind::Memristive => "memristive",
        }
    }

    /// Backing table name
    pub fn table_name(&self) -> &'static str {
        match self {
            ComponentKind::Analyte => "analytes",
            ComponentKind::BioRecognition => "bio_recognition",
            ComponentKind::Immobilization => "immobilization",
            ComponentKind::Memristive => "memristive",
        }
    }

    /// Required identifier prefix
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ComponentKind::Analyte => "TA",
            ComponentKind::BioRecognition => "BRE",
            ComponentKind::Immobilization => "IM",
            ComponentKind::Memristive => "MEM",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common accessors shared by all component records
pub trait Component {
    /// Kind of this component
    const KIND: ComponentKind;

    /// Unique identifier within the component's collection
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;
}

/// Target analyte: the substance the sensor detects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetAnalyte {
    pub ta_id: String,
    pub ta_name: String,
    pub ph_min: f64,
    pub ph_max: f64,
    /// Maximum operating temperature (°C)
    pub t_max: u32,
    /// Stability (days)
    pub stability: u32,
    /// Half-life (hours)
    pub half_life: u32,
    pub power_consumption: u32,
}

/// Bio-recognition layer: the sensing chemistry that binds the analyte
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BioRecognitionLayer {
    pub bre_id: String,
    pub bre_name: String,
    pub ph_min: f64,
    pub ph_max: f64,
    pub t_min: u32,
    pub t_max: u32,
    /// Detection range lower bound
    pub dr_min: f64,
    /// Detection range upper bound
    pub dr_max: f64,
    pub sensitivity: u32,
    /// Reproducibility (%)
    pub reproducibility: u32,
    /// Response time (seconds)
    pub response_time: u32,
    /// Stability (days)
    pub stability: u32,
    /// Limit of detection
    pub lod: u32,
    /// Durability (hours)
    pub durability: u32,
    pub power_consumption: u32,
}

/// Adhesion grade of an immobilization layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adhesion {
    Low,
    Medium,
    High,
}

impl Adhesion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Adhesion::Low => "low",
            Adhesion::Medium => "medium",
            Adhesion::High => "high",
        }
    }
}

impl FromStr for Adhesion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Adhesion::Low),
            "medium" => Ok(Adhesion::Medium),
            "high" => Ok(Adhesion::High),
            other => Err(format!("unknown adhesion grade '{}'", other)),
        }
    }
}

/// Solubility class of an immobilization layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Solubility {
    WaterSoluble,
    Organic,
    Insoluble,
}

impl Solubility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Solubility::WaterSoluble => "water_soluble",
            Solubility::Organic => "organic",
            Solubility::Insoluble => "insoluble",
        }
    }
}

impl FromStr for Solubility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "water_soluble" => Ok(Solubility::WaterSoluble),
            "organic" => Ok(Solubility::Organic),
            "insoluble" => Ok(Solubility::Insoluble),
            other => Err(format!("unknown solubility class '{}'", other)),
        }
    }
}

/// Immobilization layer: attaches the recognition layer to the substrate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmobilizationLayer {
    pub im_id: String,
    pub im_name: String,
    pub ph_min: f64,
    pub ph_max: f64,
    pub t_min: u32,
    pub t_max: u32,
    /// Young's modulus (GPa)
    pub young_modulus: u32,
    pub adhesion: Adhesion,
    pub solubility: Solubility,
    pub loss_coefficient: f64,
    pub reproducibility: u32,
    pub response_time: u32,
    pub stability: u32,
    pub durability: u32,
    pub power_consumption: u32,
}

/// Memristive layer: the signal-transduction component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemristiveLayer {
    pub mem_id: String,
    pub mem_name: String,
    pub ph_min: f64,
    pub ph_max: f64,
    pub t_min: u32,
    pub t_max: u32,
    pub dr_min: f64,
    pub dr_max: f64,
    pub young_modulus: u32,
    pub sensitivity: u32,
    pub reproducibility: u32,
    pub response_time: u32,
    pub stability: u32,
    pub lod: u32,
    pub durability: u32,
    pub power_consumption: u32,
}

impl Component for TargetAnalyte {
    const KIND: ComponentKind = ComponentKind::Analyte;

    fn id(&self) -> &str {
        &self.ta_id
    }

    fn name(&self) -> &str {
        &self.ta_name
    }
}

impl Component for BioRecognitionLayer {
    const KIND: ComponentKind = ComponentKind::BioRecognition;

    fn id(&self) -> &str {
        &self.bre_id
    }

    fn name(&self) -> &str {
        &self.bre_name
    }
}

impl Component for ImmobilizationLayer {
    const KIND: ComponentKind = ComponentKind::Immobilization;

    fn id(&self) -> &str {
        &self.im_id
    }

    fn name(&self) -> &str {
        &self.im_name
    }
}

impl Component for MemristiveLayer {
    const KIND: ComponentKind = ComponentKind::Memristive;

    fn id(&self) -> &str {
        &self.mem_id
    }

    fn name(&self) -> &str {
        &self.mem_name
    }
}

/// Duplicate-detection key of a combination: (TA, BRE, IM, MEM)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombinationKey {
    pub ta_id: String,
    pub bre_id: String,
    pub im_id: String,
    pub mem_id: String,
}

impl CombinationKey {
    pub fn new(ta_id: &str, bre_id: &str, im_id: &str, mem_id: &str) -> Self {
        Self {
            ta_id: ta_id.to_string(),
            bre_id: bre_id.to_string(),
            im_id: im_id.to_string(),
            mem_id: mem_id.to_string(),
        }
    }
}

impl fmt::Display for CombinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.ta_id, self.bre_id, self.im_id, self.mem_id)
    }
}

/// A scored (TA, BRE, IM, MEM) tuple. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorCombination {
    pub combination_id: String,
    pub ta_id: String,
    pub bre_id: String,
    pub im_id: String,
    pub mem_id: String,
    /// Compatibility score in [0, 100]
    pub score: f64,
    pub created_at: DateTime<Utc>,
}

impl SensorCombination {
    /// Tuple key used for duplicate detection
    pub fn key(&self) -> CombinationKey {
        CombinationKey::new(&self.ta_id, &self.bre_id, &self.im_id, &self.mem_id)
    }
}

/// One full sensor assembly entered in a single operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passport {
    pub analyte: TargetAnalyte,
    pub bio_recognition: BioRecognitionLayer,
    pub immobilization: ImmobilizationLayer,
    pub memristive: MemristiveLayer,
}

/// Snapshot of all four component collections, in storage order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub analytes: Vec<TargetAnalyte>,
    pub bio_recognition: Vec<BioRecognitionLayer>,
    pub immobilization: Vec<ImmobilizationLayer>,
    pub memristive: Vec<MemristiveLayer>,
}

impl Catalog {
    /// Size of the full Cartesian space
    pub fn tuple_space(&self) -> usize {
        self.analytes.len()
            * self.bio_recognition.len()
            * self.immobilization.len()
            * self.memristive.len()
    }
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub analytes: usize,
    pub bio_recognition: usize,
    pub immobilization: usize,
    pub memristive: usize,
    pub combinations: usize,
}

/// Pagination window for list operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Maximum number of records, `None` for no limit
    pub limit: Option<usize>,
    /// Number of records to skip
    pub offset: usize,
}

impl Page {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }

    /// Every record
    pub fn all() -> Self {
        Self {
            limit: None,
            offset: 0,
        }
    }

    /// Apply the window to an ordered slice
    pub fn slice<T: Clone>(&self, records: &[T]) -> Vec<T> {
        let iter = records.iter().skip(self.offset);
        match self.limit {
            Some(limit) => iter.take(limit).cloned().collect(),
            None => iter.cloned().collect(),
        }
    }
}
