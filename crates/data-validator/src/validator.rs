//! Component Validator for Identifier and Range Checking

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use storage::{
    BioRecognitionLayer, Component, ComponentKind, ImmobilizationLayer, MemristiveLayer, Passport,
    TargetAnalyte,
};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum number of characters after the identifier prefix
    pub id_suffix_max: usize,
    /// Name length bounds (characters)
    pub name_length: (usize, usize),
    /// pH bounds shared by all components
    pub ph_range: (f64, f64),
    /// Target analyte maximum temperature (°C)
    pub analyte_temp_range: (f64, f64),
    /// Bio-recognition and immobilization temperature (°C)
    pub layer_temp_range: (f64, f64),
    /// Memristive layer temperature (°C)
    pub memristive_temp_range: (f64, f64),
    /// Bio-recognition detection range
    pub bio_detection_range: (f64, f64),
    /// Memristive detection range
    pub memristive_detection_range: (f64, f64),
    pub sensitivity_range: (f64, f64),
    /// Reproducibility (%)
    pub reproducibility_range: (f64, f64),
    /// Response time (s)
    pub response_time_range: (f64, f64),
    /// Stability (days)
    pub stability_range: (f64, f64),
    /// Limit of detection
    pub lod_range: (f64, f64),
    /// Durability (hours)
    pub durability_range: (f64, f64),
    /// Half-life (hours)
    pub half_life_range: (f64, f64),
    pub power_range: (f64, f64),
    /// Young's modulus (GPa)
    pub young_modulus_range: (f64, f64),
    pub loss_coefficient_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            id_suffix_max: 20,
            name_length: (3, 255),
            ph_range: (2.0, 10.0),
            analyte_temp_range: (0.0, 180.0),
            layer_temp_range: (4.0, 120.0),
            memristive_temp_range: (5.0, 120.0),
            bio_detection_range: (0.1, 1e12),
            memristive_detection_range: (1e-7, 1e11),
            sensitivity_range: (0.0, 20000.0),
            reproducibility_range: (0.0, 100.0),
            response_time_range: (0.0, 3600.0),
            stability_range: (0.0, 365.0),
            lod_range: (0.0, 50000.0),
            durability_range: (0.0, 8760.0),
            half_life_range: (0.0, 8760.0),
            power_range: (0.0, 1000.0),
            young_modulus_range: (0.0, 1000.0),
            loss_coefficient_range: (0.0, 1.0),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of constraints checked
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }

    /// Fold another result into this one
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.valid &= other.valid;
        self.errors.extend(other.errors);
        self.fields_checked += other.fields_checked;
        self
    }

    /// Convert into a `Result`, keeping every violation
    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.valid {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Accumulates violations for one record
struct Checks<'a> {
    validator: &'a Validator,
    errors: Vec<ValidationError>,
    checked: usize,
}

impl<'a> Checks<'a> {
    fn new(validator: &'a Validator) -> Self {
        Self {
            validator,
            errors: Vec::new(),
            checked: 0,
        }
    }

    fn push(&mut self, outcome: Result<(), ValidationError>) -> &mut Self {
        self.checked += 1;
        if let Err(e) = outcome {
            self.errors.push(e);
        }
        self
    }

    fn range(&mut self, field: &'static str, value: f64, range: (f64, f64)) -> &mut Self {
        let outcome = self.validator.validate_range(field, value, range);
        self.push(outcome)
    }

    fn ordered(
        &mut self,
        lower_field: &'static str,
        lower: f64,
        upper_field: &'static str,
        upper: f64,
    ) -> &mut Self {
        let outcome = if lower > upper {
            Err(ValidationError::InvertedRange {
                lower_field,
                lower,
                upper_field,
                upper,
            })
        } else {
            Ok(())
        };
        self.push(outcome)
    }

    fn component<C: Component>(
        &mut self,
        id_field: &'static str,
        name_field: &'static str,
        record: &C,
    ) -> &mut Self {
        let id = self
            .validator
            .validate_identifier(id_field, C::KIND, record.id());
        self.push(id);
        let name = self.validator.validate_name(name_field, record.name());
        self.push(name)
    }

    fn finish(&mut self) -> ValidationResult {
        let errors = std::mem::take(&mut self.errors);
        if errors.is_empty() {
            ValidationResult::valid(self.checked)
        } else {
            debug!(violations = errors.len(), "Record failed validation");
            ValidationResult::invalid(errors, self.checked)
        }
    }
}

/// Validator for component records
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a closed range. NaN is always rejected.
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if value >= range.0 && value <= range.1 {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        }
    }

    /// Validate `<PREFIX>[A-Z0-9_-]{1,N}`
    pub fn validate_identifier(
        &self,
        field: &'static str,
        kind: ComponentKind,
        value: &str,
    ) -> Result<(), ValidationError> {
        let prefix = kind.id_prefix();
        let valid = value.strip_prefix(prefix).map_or(false, |suffix| {
            let len = suffix.chars().count();
            len >= 1
                && len <= self.config.id_suffix_max
                && suffix
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-')
        });

        if valid {
            Ok(())
        } else {
            Err(ValidationError::InvalidIdentifier {
                field,
                value: value.to_string(),
                prefix,
            })
        }
    }

    /// Validate a display name's length in characters
    pub fn validate_name(&self, field: &'static str, value: &str) -> Result<(), ValidationError> {
        let len = value.chars().count();
        let (min, max) = self.config.name_length;
        if len < min || len > max {
            Err(ValidationError::InvalidLength {
                field,
                len,
                min,
                max,
            })
        } else {
            Ok(())
        }
    }

    /// Validate a target analyte
    pub fn validate_analyte(&self, r: &TargetAnalyte) -> ValidationResult {
        let c = &self.config;
        Checks::new(self)
            .component("ta_id", "ta_name", r)
            .range("ph_min", r.ph_min, c.ph_range)
            .range("ph_max", r.ph_max, c.ph_range)
            .ordered("ph_min", r.ph_min, "ph_max", r.ph_max)
            .range("t_max", r.t_max as f64, c.analyte_temp_range)
            .range("stability", r.stability as f64, c.stability_range)
            .range("half_life", r.half_life as f64, c.half_life_range)
            .range("power_consumption", r.power_consumption as f64, c.power_range)
            .finish()
    }

    /// Validate a bio-recognition layer
    pub fn validate_bio_recognition(&self, r: &BioRecognitionLayer) -> ValidationResult {
        let c = &self.config;
        Checks::new(self)
            .component("bre_id", "bre_name", r)
            .range("ph_min", r.ph_min, c.ph_range)
            .range("ph_max", r.ph_max, c.ph_range)
            .ordered("ph_min", r.ph_min, "ph_max", r.ph_max)
            .range("t_min", r.t_min as f64, c.layer_temp_range)
            .range("t_max", r.t_max as f64, c.layer_temp_range)
            .ordered("t_min", r.t_min as f64, "t_max", r.t_max as f64)
            .range("dr_min", r.dr_min, c.bio_detection_range)
            .range("dr_max", r.dr_max, c.bio_detection_range)
            .ordered("dr_min", r.dr_min, "dr_max", r.dr_max)
            .range("sensitivity", r.sensitivity as f64, c.sensitivity_range)
            .range("reproducibility", r.reproducibility as f64, c.reproducibility_range)
            .range("response_time", r.response_time as f64, c.response_time_range)
            .range("stability", r.stability as f64, c.stability_range)
            .range("lod", r.lod as f64, c.lod_range)
            .range("durability", r.durability as f64, c.durability_range)
            .range("power_consumption", r.power_consumption as f64, c.power_range)
            .finish()
    }

    /// Validate an immobilization layer
    pub fn validate_immobilization(&self, r: &ImmobilizationLayer) -> ValidationResult {
        let c = &self.config;
        Checks::new(self)
            .component("im_id", "im_name", r)
            .range("ph_min", r.ph_min, c.ph_range)
            .range("ph_max", r.ph_max, c.ph_range)
            .ordered("ph_min", r.ph_min, "ph_max", r.ph_max)
            .range("t_min", r.t_min as f64, c.layer_temp_range)
            .range("t_max", r.t_max as f64, c.layer_temp_range)
            .ordered("t_min", r.t_min as f64, "t_max", r.t_max as f64)
            .range("young_modulus", r.young_modulus as f64, c.young_modulus_range)
            .range("loss_coefficient", r.loss_coefficient, c.loss_coefficient_range)
            .range("reproducibility", r.reproducibility as f64, c.reproducibility_range)
            .range("response_time", r.response_time as f64, c.response_time_range)
            .range("stability", r.stability as f64, c.stability_range)
            .range("durability", r.durability as f64, c.durability_range)
            .range("power_consumption", r.power_consumption as f64, c.power_range)
            .finish()
    }

    /// Validate a memristive layer
    pub fn validate_memristive(&self, r: &MemristiveLayer) -> ValidationResult {
        let c = &self.config;
        Checks::new(self)
            .component("mem_id", "mem_name", r)
            .range("ph_min", r.ph_min, c.ph_range)
            .range("ph_max", r.ph_max, c.ph_range)
            .ordered("ph_min", r.ph_min, "ph_max", r.ph_max)
            .range("t_min", r.t_min as f64, c.memristive_temp_range)
            .range("t_max", r.t_max as f64, c.memristive_temp_range)
            .ordered("t_min", r.t_min as f64, "t_max", r.t_max as f64)
            .range("dr_min", r.dr_min, c.memristive_detection_range)
            .range("dr_max", r.dr_max, c.memristive_detection_range)
            .ordered("dr_min", r.dr_min, "dr_max", r.dr_max)
            .range("young_modulus", r.young_modulus as f64, c.young_modulus_range)
            .range("sensitivity", r.sensitivity as f64, c.sensitivity_range)
            .range("reproducibility", r.reproducibility as f64, c.reproducibility_range)
            .range("response_time", r.response_time as f64, c.response_time_range)
            .range("stability", r.stability as f64, c.stability_range)
            .range("lod", r.lod as f64, c.lod_range)
            .range("durability", r.durability as f64, c.durability_range)
            .range("power_consumption", r.power_consumption as f64, c.power_range)
            .finish()
    }

    /// Validate all four components of a passport
    pub fn validate_passport(&self, p: &Passport) -> ValidationResult {
        self.validate_analyte(&p.analyte)
            .merge(self.validate_bio_recognition(&p.bio_recognition))
            .merge(self.validate_immobilization(&p.immobilization))
            .merge(self.validate_memristive(&p.memristive))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use storage::fixtures;

    #[test]
    fn test_fixtures_are_valid() {
        let validator = Validator::default();
        assert!(validator.validate_analyte(&fixtures::analyte("TA1")).valid);
        assert!(validator.validate_bio_recognition(&fixtures::bio_recognition("BRE1")).valid);
        assert!(validator.validate_immobilization(&fixtures::immobilization("IM1")).valid);
        assert!(validator.validate_memristive(&fixtures::memristive("MEM1")).valid);
        assert!(validator.validate_passport(&fixtures::passport("_01")).valid);
    }

    #[test]
    fn test_identifier_pattern() {
        let validator = Validator::default();
        let kind = ComponentKind::BioRecognition;
        assert!(validator.validate_identifier("bre_id", kind, "BRE1").is_ok());
        assert!(validator.validate_identifier("bre_id", kind, "BRE_GLUCOSE-OX").is_ok());
        assert!(validator.validate_identifier("bre_id", kind, "BRE").is_err());
        assert!(validator.validate_identifier("bre_id", kind, "BREglucose").is_err());
        assert!(validator.validate_identifier("bre_id", kind, "TA1").is_err());
        assert!(validator
            .validate_identifier("bre_id", kind, &format!("BRE{}", "A".repeat(21)))
            .is_err());
    }

    #[test]
    fn test_collects_every_violation() {
        let validator = Validator::default();
        let mut analyte = fixtures::analyte("TA1");
        analyte.ta_name = "ab".to_string();
        analyte.ph_min = 1.0;
        analyte.stability = 400;

        let result = validator.validate_analyte(&analyte);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors.iter().any(|e| matches!(
            e,
            ValidationError::OutOfRange { field: "ph_min", .. }
        )));
    }

    #[test]
    fn test_inverted_ph_range() {
        let validator = Validator::default();
        let mut layer = fixtures::memristive("MEM1");
        layer.ph_min = 9.0;
        layer.ph_max = 4.0;

        let errors = validator.validate_memristive(&layer).into_result().unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvertedRange {
                lower_field: "ph_min",
                lower: 9.0,
                upper_field: "ph_max",
                upper: 4.0,
            }]
        );
    }

    #[test]
    fn test_memristive_temperature_floor_differs() {
        let validator = Validator::default();
        let mut bre = fixtures::bio_recognition("BRE1");
        bre.t_min = 4;
        assert!(validator.validate_bio_recognition(&bre).valid);

        let mut mem = fixtures::memristive("MEM1");
        mem.t_min = 4;
        assert!(!validator.validate_memristive(&mem).valid);
    }

    #[test]
    fn test_nan_rejected() {
        let validator = Validator::default();
        assert!(validator.validate_range("ph_min", f64::NAN, (2.0, 10.0)).is_err());
    }

    #[test]
    fn test_passport_merges_results() {
        let validator = Validator::default();
        let mut passport = fixtures::passport("1");
        passport.immobilization.loss_coefficient = 1.5;
        passport.memristive.mem_id = "MX1".to_string();

        let result = validator.validate_passport(&passport);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_ph_inside_bounds_is_accepted(min in 2.0f64..=10.0, span in 0.0f64..=8.0) {
            let validator = Validator::default();
            let mut analyte = fixtures::analyte("TA1");
            analyte.ph_min = min;
            analyte.ph_max = (min + span).min(10.0);
            prop_assert!(validator.validate_analyte(&analyte).valid);
        }
    }
}
