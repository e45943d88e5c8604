//! Review warnings and missing-field reporting.

use crate::models::intake::{ConfidenceMap, ExtractedFields, Field, FieldWarning};

/// Fields scoring below this (and above zero) are flagged for review.
pub const REVIEW_THRESHOLD: f32 = 0.90;

/// Message shown to the reviewer for a low-confidence field.
pub fn low_confidence_message(confidence: f32) -> String {
    format!(
        "Confianza baja ({}%) - revisar manualmente",
        (confidence * 100.0).round() as u32
    )
}

/// Warn on every present field with `0 < confidence < threshold`.
pub fn build_warnings(
    fields: &ExtractedFields,
    confidence: &ConfidenceMap,
    threshold: f32,
) -> Vec<FieldWarning> {
    confidence
        .iter()
        .filter(|(_, c)| *c > 0.0 && *c < threshold)
        .filter_map(|(field, c)| {
            fields.value(field).map(|value| FieldWarning {
                field,
                message: low_confidence_message(c),
                value,
            })
        })
        .collect()
}

/// Fields that still need manual entry.
///
/// Name and admission date are listed when absent; diagnosis and service are
/// never extracted and are always listed.
pub fn missing_fields(fields: &ExtractedFields) -> Vec<Field> {
    [Field::Name, Field::AdmissionDate]
        .into_iter()
        .filter(|f| !fields.is_present(*f))
        .chain(Field::MANUAL_ONLY)
        .collect()
}
