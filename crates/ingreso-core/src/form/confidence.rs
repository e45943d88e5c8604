//! Heuristic per-field confidence scoring.
//!
//! Scores are review hints, not probabilities: each present field gets a high
//! score when it has the expected shape and a lower one otherwise.

use crate::models::intake::{ConfidenceMap, ExtractedFields, Field, FieldValue};

use super::rules::age::is_plausible_age;
use super::rules::patterns::{BED_SHAPE, DATE_SHAPE};
use super::rules::rut::validate_rut;

/// Score table.
pub mod scores {
    pub const RUT_VALID: f32 = 0.98;
    pub const RUT_UNVERIFIED: f32 = 0.70;

    pub const AGE_IN_RANGE: f32 = 0.95;
    pub const AGE_OUT_OF_RANGE: f32 = 0.50;

    pub const NAME_UPPERCASE: f32 = 0.92;
    pub const NAME_MIXED: f32 = 0.75;

    pub const BED_WARD_CODE: f32 = 0.88;
    pub const BED_IRREGULAR: f32 = 0.65;

    pub const DATE_FORMATTED: f32 = 0.90;
    pub const DATE_IRREGULAR: f32 = 0.60;

    pub const PREVISION: f32 = 0.85;

    /// Any other present value.
    pub const DEFAULT: f32 = 0.80;
}

/// Score a single present value.
pub fn score_value(field: Field, value: &FieldValue) -> f32 {
    match (field, value) {
        (Field::Rut, FieldValue::Text(rut)) => {
            if validate_rut(rut) {
                scores::RUT_VALID
            } else {
                scores::RUT_UNVERIFIED
            }
        }
        (Field::Age, FieldValue::Number(age)) => {
            if is_plausible_age(*age) {
                scores::AGE_IN_RANGE
            } else {
                scores::AGE_OUT_OF_RANGE
            }
        }
        (Field::Name, FieldValue::Text(name)) => {
            let uppercase = *name == name.to_uppercase();
            if uppercase && !name.chars().any(|c| c.is_ascii_digit()) {
                scores::NAME_UPPERCASE
            } else {
                scores::NAME_MIXED
            }
        }
        (Field::Bed, FieldValue::Text(bed)) => {
            if BED_SHAPE.is_match(bed) {
                scores::BED_WARD_CODE
            } else {
                scores::BED_IRREGULAR
            }
        }
        (Field::AdmissionDate, FieldValue::Text(date)) => {
            if DATE_SHAPE.is_match(date) {
                scores::DATE_FORMATTED
            } else {
                scores::DATE_IRREGULAR
            }
        }
        (Field::Prevision, _) => scores::PREVISION,
        _ => scores::DEFAULT,
    }
}

/// Score a field of an extraction result. Absent fields score 0.
pub fn score_field(fields: &ExtractedFields, field: Field) -> f32 {
    fields
        .value(field)
        .map_or(0.0, |value| score_value(field, &value))
}

/// Score all six extracted fields.
pub fn score_fields(fields: &ExtractedFields) -> ConfidenceMap {
    let mut map = ConfidenceMap::default();
    for field in Field::EXTRACTED {
        map.set(field, score_field(fields, field));
    }
    map
}
