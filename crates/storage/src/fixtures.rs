//! Sample records for tests and local demos.
//!
//! Every builder produces a record that passes entry-layer validation.

use crate::records::{
    Adhesion, BioRecognitionLayer, ImmobilizationLayer, MemristiveLayer, Passport, Solubility,
    TargetAnalyte,
};

pub fn analyte(id: &str) -> TargetAnalyte {
    TargetAnalyte {
        ta_id: id.to_string(),
        ta_name: format!("Analyte {}", id),
        ph_min: 5.0,
        ph_max: 8.0,
        t_max: 45,
        stability: 30,
        half_life: 48,
        power_consumption: 10,
    }
}

pub fn bio_recognition(id: &str) -> BioRecognitionLayer {
    BioRecognitionLayer {
        bre_id: id.to_string(),
        bre_name: format!("Recognition {}", id),
        ph_min: 6.0,
        ph_max: 8.0,
        t_min: 10,
        t_max: 40,
        dr_min: 0.1,
        dr_max: 1000.0,
        sensitivity: 10000,
        reproducibility: 90,
        response_time: 30,
        stability: 180,
        lod: 50,
        durability: 720,
        power_consumption: 5,
    }
}

pub fn immobilization(id: &str) -> ImmobilizationLayer {
    ImmobilizationLayer {
        im_id: id.to_string(),
        im_name: format!("Matrix {}", id),
        ph_min: 4.0,
        ph_max: 9.0,
        t_min: 4,
        t_max: 60,
        young_modulus: 200,
        adhesion: Adhesion::High,
        solubility: Solubility::Insoluble,
        loss_coefficient: 0.1,
        reproducibility: 80,
        response_time: 10,
        stability: 365,
        durability: 2000,
        power_consumption: 0,
    }
}

pub fn memristive(id: &str) -> MemristiveLayer {
    MemristiveLayer {
        mem_id: id.to_string(),
        mem_name: format!("Oxide {}", id),
        ph_min: 3.0,
        ph_max: 10.0,
        t_min: 5,
        t_max: 85,
        dr_min: 0.001,
        dr_max: 10000.0,
        young_modulus: 150,
        sensitivity: 5000,
        reproducibility: 70,
        response_time: 1,
        stability: 90,
        lod: 10,
        durability: 5000,
        power_consumption: 20,
    }
}

/// A passport whose four identifiers share the given suffix
pub fn passport(suffix: &str) -> Passport {
    Passport {
        analyte: analyte(&format!("TA{}", suffix)),
        bio_recognition: bio_recognition(&format!("BRE{}", suffix)),
        immobilization: immobilization(&format!("IM{}", suffix)),
        memristive: memristive(&format!("MEM{}", suffix)),
    }
}
