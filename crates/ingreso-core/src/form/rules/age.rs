//! Patient age extraction.

use tracing::trace;

use super::patterns::{AGE_LABELED, AGE_YEARS};
use super::{ExtractionMatch, FieldExtractor};

/// Age field extractor.
///
/// Tries "`<n> AÑOS`" first, then "`Edad: <n>`". Only `0 < age < 120` is accepted.
pub struct AgeExtractor;

impl AgeExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AgeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AgeExtractor {
    type Output = ExtractionMatch<u32>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for pattern in [&*AGE_YEARS, &*AGE_LABELED] {
            for caps in pattern.captures_iter(text) {
                let full_match = caps.get(0).unwrap();
                let Ok(age) = caps[1].parse::<u32>() else {
                    continue;
                };

                if !is_plausible_age(age) {
                    trace!("Discarding age candidate {:?}", full_match.as_str());
                    continue;
                }

                results.push(
                    ExtractionMatch::new(age, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}

/// Check the open range `0 < age < 120`.
pub fn is_plausible_age(age: u32) -> bool {
    age > 0 && age < 120
}

/// Extract patient age from text.
pub fn extract_age(text: &str) -> Option<u32> {
    AgeExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_age_years() {
        assert_eq!(extract_age("68 AÑOS"), Some(68));
        assert_eq!(extract_age("paciente de 45 años, sexo F"), Some(45));
        assert_eq!(extract_age("EDAD 7AÑOS"), Some(7));
    }

    #[test]
    fn test_extract_age_ocr_without_tilde() {
        assert_eq!(extract_age("32 ANOS"), Some(32));
    }

    #[test]
    fn test_extract_age_labeled() {
        assert_eq!(extract_age("RUT 7.654.321-6\nEdad: 54\nSexo: M"), Some(54));
        assert_eq!(extract_age("EDAD 81"), Some(81));
    }

    #[test]
    fn test_years_pattern_preferred_over_label() {
        assert_eq!(extract_age("Edad: 3\n40 AÑOS"), Some(40));
    }

    #[test]
    fn test_age_range() {
        assert_eq!(extract_age("0 AÑOS"), None);
        assert_eq!(extract_age("120 AÑOS"), None);
        assert_eq!(extract_age("Edad: 150"), None);
        assert_eq!(extract_age("119 AÑOS"), Some(119));
        assert_eq!(extract_age("Edad: 0\n25 AÑOS"), Some(25));
    }

    #[test]
    fn test_no_age() {
        assert_eq!(extract_age("CAMA B204"), None);
        assert_eq!(extract_age(""), None);
    }
}
