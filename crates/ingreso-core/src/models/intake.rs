//! Output model: the partially-trusted patient intake record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Field names reported by the parser.
///
/// The first six are extracted from text; `Diagnosis` and `Service` are never
/// auto-extracted and always require manual entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Rut,
    Age,
    Prevision,
    AdmissionDate,
    Bed,
    Diagnosis,
    Service,
}

impl Field {
    /// Fields the extractors attempt, in reporting order.
    pub const EXTRACTED: [Field; 6] = [
        Field::Name,
        Field::Rut,
        Field::Age,
        Field::Prevision,
        Field::AdmissionDate,
        Field::Bed,
    ];

    /// Fields that always need a human.
    pub const MANUAL_ONLY: [Field; 2] = [Field::Diagnosis, Field::Service];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Rut => "rut",
            Field::Age => "age",
            Field::Prevision => "prevision",
            Field::AdmissionDate => "admissionDate",
            Field::Bed => "bed",
            Field::Diagnosis => "diagnosis",
            Field::Service => "service",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single extracted value, text or integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(u32),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// The six extracted slots. Each is either a validated value or absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    /// Patient full name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// National ID (RUT), as it appeared in the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rut: Option<String>,

    /// Age in years.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,

    /// Canonical insurance plan name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevision: Option<String>,

    /// Admission date as `DD/MM/YYYY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<String>,

    /// Bed identifier, upper-cased.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bed: Option<String>,
}

impl ExtractedFields {
    /// Value of a field, if extracted. Manual-only fields are always `None`.
    pub fn value(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::Name => self.name.clone().map(FieldValue::Text),
            Field::Rut => self.rut.clone().map(FieldValue::Text),
            Field::Age => self.age.map(FieldValue::Number),
            Field::Prevision => self.prevision.clone().map(FieldValue::Text),
            Field::AdmissionDate => self.admission_date.clone().map(FieldValue::Text),
            Field::Bed => self.bed.clone().map(FieldValue::Text),
            Field::Diagnosis | Field::Service => None,
        }
    }

    /// Check if a field was extracted.
    pub fn is_present(&self, field: Field) -> bool {
        match field {
            Field::Name => self.name.is_some(),
            Field::Rut => self.rut.is_some(),
            Field::Age => self.age.is_some(),
            Field::Prevision => self.prevision.is_some(),
            Field::AdmissionDate => self.admission_date.is_some(),
            Field::Bed => self.bed.is_some(),
            Field::Diagnosis | Field::Service => false,
        }
    }

    /// Number of extracted fields.
    pub fn count(&self) -> usize {
        Field::EXTRACTED.iter().filter(|f| self.is_present(**f)).count()
    }
}

/// Per-field confidence in `[0, 1]`. Absent fields score 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceMap {
    pub name: f32,
    pub rut: f32,
    pub age: f32,
    pub prevision: f32,
    pub admission_date: f32,
    pub bed: f32,
}

impl ConfidenceMap {
    /// Confidence for a field. Manual-only fields are always 0.
    pub fn get(&self, field: Field) -> f32 {
        match field {
            Field::Name => self.name,
            Field::Rut => self.rut,
            Field::Age => self.age,
            Field::Prevision => self.prevision,
            Field::AdmissionDate => self.admission_date,
            Field::Bed => self.bed,
            Field::Diagnosis | Field::Service => 0.0,
        }
    }

    /// Set the confidence for a field, clamped to `[0, 1]`.
    pub fn set(&mut self, field: Field, confidence: f32) {
        let confidence = confidence.clamp(0.0, 1.0);
        match field {
            Field::Name => self.name = confidence,
            Field::Rut => self.rut = confidence,
            Field::Age => self.age = confidence,
            Field::Prevision => self.prevision = confidence,
            Field::AdmissionDate => self.admission_date = confidence,
            Field::Bed => self.bed = confidence,
            Field::Diagnosis | Field::Service => {}
        }
    }

    /// Iterate `(field, confidence)` in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, f32)> + '_ {
        Field::EXTRACTED.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Mean confidence over the six extracted fields (absent counts as 0).
    pub fn overall(&self) -> f32 {
        self.iter().map(|(_, c)| c).sum::<f32>() / Field::EXTRACTED.len() as f32
    }
}

/// A field a human reviewer should double-check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWarning {
    pub field: Field,
    pub message: String,
    pub value: FieldValue,
}

/// Result of parsing one admission form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    /// Extracted values.
    pub fields: ExtractedFields,

    /// Confidence per extracted field.
    pub confidence: ConfidenceMap,

    /// Low-confidence fields, in reporting order.
    pub warnings: Vec<FieldWarning>,

    /// Fields still requiring manual entry.
    pub missing_fields: Vec<Field>,
}

impl ParseResult {
    /// Check if a field was flagged for review.
    pub fn needs_review(&self, field: Field) -> bool {
        self.warnings.iter().any(|w| w.field == field)
    }

    /// Check if a field still requires manual entry.
    pub fn is_missing(&self, field: Field) -> bool {
        self.missing_fields.contains(&field)
    }
}
