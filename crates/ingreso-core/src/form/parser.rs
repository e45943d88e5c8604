//! Admission form parser: runs every field rule, scores and reports.

use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::intake::{ExtractedFields, Field, ParseResult};
use crate::models::recognized::{RecognizedText, TextBlock};

use super::confidence::score_fields;
use super::report::{build_warnings, missing_fields, REVIEW_THRESHOLD};
use super::rules::{
    extract_name, AdmissionDateExtractor, AgeExtractor, BedExtractor, FieldExtractor,
    PrevisionExtractor, RutExtractor,
};
use super::FormParser;

/// Rule-based admission form parser.
#[derive(Debug, Clone)]
pub struct AdmissionFormParser {
    /// Whether to discard RUT candidates with a wrong check character.
    validate_rut: bool,
    /// Date unlabelled dates are compared against; today when unset.
    reference_date: Option<NaiveDate>,
    /// Confidence below which a present field is flagged.
    review_threshold: f32,
}

impl AdmissionFormParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            validate_rut: true,
            reference_date: None,
            review_threshold: REVIEW_THRESHOLD,
        }
    }

    /// Build a parser from the extraction section of the configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let parser = Self::new()
            .with_rut_validation(config.validate_rut)
            .with_review_threshold(config.review_threshold);

        match config.reference_date {
            Some(date) => parser.with_reference_date(date),
            None => parser,
        }
    }

    /// Set RUT checksum validation.
    pub fn with_rut_validation(mut self, validate: bool) -> Self {
        self.validate_rut = validate;
        self
    }

    /// Set the reference date for admission date disambiguation.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Set the review warning threshold.
    pub fn with_review_threshold(mut self, threshold: f32) -> Self {
        self.review_threshold = threshold;
        self
    }

    /// Run every field rule independently over the same text.
    pub fn extract_fields(&self, full_text: &str, blocks: &[TextBlock]) -> ExtractedFields {
        let reference = self
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());

        ExtractedFields {
            name: extract_name(full_text, blocks),
            rut: RutExtractor::new()
                .with_validation(self.validate_rut)
                .extract(full_text)
                .map(|m| m.value),
            age: AgeExtractor::new().extract(full_text).map(|m| m.value),
            prevision: PrevisionExtractor::new().extract(full_text).map(|m| m.value),
            admission_date: AdmissionDateExtractor::new()
                .with_reference_date(reference)
                .extract(full_text)
                .map(|m| m.value.format()),
            bed: BedExtractor::new().extract(full_text).map(|m| m.value),
        }
    }

    /// Parse a transcript and its blocks.
    pub fn parse_parts(&self, full_text: &str, blocks: &[TextBlock]) -> ParseResult {
        let start = Instant::now();

        info!(
            "Parsing admission form from {} characters of text and {} blocks",
            full_text.len(),
            blocks.len()
        );

        let fields = self.extract_fields(full_text, blocks);
        for field in Field::EXTRACTED {
            match fields.value(field) {
                Some(value) => debug!("Extracted {}: {}", field, value),
                None => debug!("No value for {}", field),
            }
        }

        let confidence = score_fields(&fields);
        let warnings = build_warnings(&fields, &confidence, self.review_threshold);
        let missing_fields = missing_fields(&fields);

        debug!(
            "Extracted {}/{} fields with {} warnings in {:?}",
            fields.count(),
            Field::EXTRACTED.len(),
            warnings.len(),
            start.elapsed()
        );

        ParseResult {
            fields,
            confidence,
            warnings,
            missing_fields,
        }
    }
}

impl Default for AdmissionFormParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FormParser for AdmissionFormParser {
    fn parse(&self, input: &RecognizedText) -> ParseResult {
        self.parse_parts(&input.full_text, &input.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::intake::{ConfidenceMap, FieldValue, FieldWarning};
    use pretty_assertions::assert_eq;

    const SCENARIO: &str = "NOMBRE: JUANA PEREZ SOTO\n\
                            RUT 7.654.321-6\n\
                            68 AÑOS\n\
                            ASEGURADOR/PLAN: FONASA/TRAMO B\n\
                            INGRESO: 02/11/2025\n\
                            CAMA: B204";

    fn parser() -> AdmissionFormParser {
        AdmissionFormParser::new().with_reference_date(NaiveDate::from_ymd_opt(2025, 11, 2).unwrap())
    }

    #[test]
    fn test_parse_full_form() {
        let result = parser().parse_text(SCENARIO);

        assert_eq!(
            result.fields,
            ExtractedFields {
                name: Some("JUANA PEREZ SOTO".to_string()),
                rut: Some("7.654.321-6".to_string()),
                age: Some(68),
                prevision: Some("Fonasa".to_string()),
                admission_date: Some("02/11/2025".to_string()),
                bed: Some("B204".to_string()),
            }
        );
        assert_eq!(result.missing_fields, vec![Field::Diagnosis, Field::Service]);
        assert_eq!(
            result.confidence,
            ConfidenceMap {
                name: 0.92,
                rut: 0.98,
                age: 0.95,
                prevision: 0.85,
                admission_date: 0.90,
                bed: 0.88,
            }
        );
    }

    #[test]
    fn test_full_form_flags_only_sub_threshold_scores() {
        let result = parser().parse_text(SCENARIO);

        assert_eq!(
            result.warnings,
            vec![
                FieldWarning {
                    field: Field::Prevision,
                    message: "Confianza baja (85%) - revisar manualmente".to_string(),
                    value: FieldValue::Text("Fonasa".to_string()),
                },
                FieldWarning {
                    field: Field::Bed,
                    message: "Confianza baja (88%) - revisar manualmente".to_string(),
                    value: FieldValue::Text("B204".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_lower_threshold_silences_warnings() {
        let result = parser().with_review_threshold(0.80).parse_text(SCENARIO);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_parse_empty_input() {
        let result = parser().parse_text("");

        assert_eq!(result.fields, ExtractedFields::default());
        assert_eq!(result.confidence, ConfidenceMap::default());
        assert!(result.warnings.is_empty());
        assert_eq!(
            result.missing_fields,
            vec![Field::Name, Field::AdmissionDate, Field::Diagnosis, Field::Service]
        );
    }

    #[test]
    fn test_parse_with_blocks() {
        let input = RecognizedText::new(
            "HOSPITAL REGIONAL\nTIPO PACIENTE: CONVENCIONAL\n15/03/1950\n01/11/2025\nCAMA: SALA7",
            vec![
                TextBlock::new("TIPO PACIENTE: CONVENCIONAL"),
                TextBlock::new("Nombre y apellido"),
                TextBlock::new("Carla Núñez Vidal"),
            ],
        );
        let result = parser().parse(&input);

        assert_eq!(result.fields.name.as_deref(), Some("Carla Núñez Vidal"));
        assert_eq!(result.fields.admission_date.as_deref(), Some("01/11/2025"));
        assert_eq!(result.fields.bed.as_deref(), Some("SALA7"));
        assert_eq!(result.confidence.name, 0.75);
        assert_eq!(result.confidence.bed, 0.65);
        assert!(result.needs_review(Field::Name));
        assert!(result.needs_review(Field::Bed));
        assert!(!result.needs_review(Field::AdmissionDate));
    }

    #[test]
    fn test_unvalidated_rut_scored_low() {
        let text = "RUT 12.345.678-9";

        let strict = parser().parse_text(text);
        assert_eq!(strict.fields.rut, None);
        assert_eq!(strict.confidence.rut, 0.0);

        let lenient = parser().with_rut_validation(false).parse_text(text);
        assert_eq!(lenient.fields.rut.as_deref(), Some("12.345.678-9"));
        assert_eq!(lenient.confidence.rut, 0.70);
        assert!(lenient.needs_review(Field::Rut));
    }

    #[test]
    fn test_manual_fields_always_missing() {
        for text in [SCENARIO, "", "CAMA: B204", "PACIENTE: ANA ROJAS\nFECHA: 01/01/2025"] {
            let result = parser().parse_text(text);
            assert!(result.is_missing(Field::Diagnosis), "{:?}", text);
            assert!(result.is_missing(Field::Service), "{:?}", text);
        }
    }

    #[test]
    fn test_from_config() {
        let config = ExtractionConfig {
            validate_rut: false,
            review_threshold: 0.5,
            reference_date: NaiveDate::from_ymd_opt(2025, 11, 2),
        };
        let parser = AdmissionFormParser::from_config(&config);

        let result = parser.parse_text("RUT 12.345.678-9\n15/03/1950 02/11/2025");
        assert_eq!(result.fields.rut.as_deref(), Some("12.345.678-9"));
        assert_eq!(result.fields.admission_date.as_deref(), Some("02/11/2025"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let result = parser().parse_text("CAMA: SALA7");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["fields"], serde_json::json!({"bed": "SALA7"}));
        assert_eq!(json["warnings"][0]["field"], "bed");
        assert_eq!(json["warnings"][0]["value"], "SALA7");
        assert_eq!(
            json["missingFields"],
            serde_json::json!(["name", "admissionDate", "diagnosis", "service"])
        );
    }
}
