//! RUT (Chilean national ID) extraction and validation.

use tracing::trace;

use super::patterns::RUT_PATTERN;
use super::{ExtractionMatch, FieldExtractor};

/// RUT field extractor.
pub struct RutExtractor {
    validate: bool,
}

impl RutExtractor {
    /// Create a new RUT extractor.
    pub fn new() -> Self {
        Self { validate: true }
    }

    /// Set whether to validate RUT check characters.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

impl Default for RutExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for RutExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for m in RUT_PATTERN.find_iter(text) {
            let rut = m.as_str().to_uppercase();

            if self.validate && !validate_rut(&rut) {
                trace!("Discarding RUT candidate {} (check character mismatch)", rut);
                continue;
            }

            results.push(ExtractionMatch::new(rut, m.as_str()).with_position(m.start(), m.end()));
        }

        results
    }
}

/// Extract the first checksum-valid RUT from text, keeping its surface form.
pub fn extract_rut(text: &str) -> Option<String> {
    RutExtractor::new().extract(text).map(|m| m.value)
}

/// Validate a RUT using the modulo-11 check character.
///
/// Dots and dashes are ignored, so `7.654.321-6` and `76543216` validate
/// identically. At least 8 characters must remain after stripping them.
pub fn validate_rut(rut: &str) -> bool {
    let clean: String = rut.chars().filter(|c| *c != '.' && *c != '-').collect();

    if clean.chars().count() < 8 {
        return false;
    }

    let mut chars: Vec<char> = clean.chars().collect();
    let check = chars.pop().map(|c| c.to_ascii_uppercase());
    let body: String = chars.into_iter().collect();

    match (compute_check_char(&body), check) {
        (Some(expected), Some(check)) => expected == check,
        _ => false,
    }
}

/// Compute the check character for a RUT body.
///
/// Digits are weighted right to left with multipliers cycling 2..=7; the
/// result is `11 - sum % 11`, with 11 mapping to `'0'` and 10 to `'K'`.
/// Returns `None` when the body is empty or not all digits.
pub fn compute_check_char(body: &str) -> Option<char> {
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let sum: u32 = body
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .zip([2, 3, 4, 5, 6, 7].into_iter().cycle())
        .map(|(d, w)| d * w)
        .sum();

    match 11 - sum % 11 {
        11 => Some('0'),
        10 => Some('K'),
        n => char::from_digit(n, 10),
    }
}

/// Format a RUT with thousands dots and a dash (XX.XXX.XXX-C).
///
/// Input that does not look like a RUT is returned unchanged.
pub fn format_rut(rut: &str) -> String {
    let clean: String = rut
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if clean.len() < 2 {
        return rut.to_string();
    }

    let (body, check) = clean.split_at(clean.len() - 1);
    if !body.chars().all(|c| c.is_ascii_digit()) {
        return rut.to_string();
    }

    let mut grouped = String::with_capacity(body.len() + body.len() / 3);
    for (i, c) in body.chars().enumerate() {
        if i > 0 && (body.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!("{}-{}", grouped, check)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rut_valid() {
        assert!(validate_rut("12.345.678-5"));
        assert!(validate_rut("7.654.321-6"));
        assert!(validate_rut("10.000.013-K"));
        assert!(validate_rut("6000000-k")); // Lowercase check character
        assert!(validate_rut("10000004-0")); // Check character zero
        assert!(validate_rut("11.222.333-9"));
    }

    #[test]
    fn test_validate_rut_invalid() {
        assert!(!validate_rut("12.345.678-9")); // Wrong digit
        assert!(!validate_rut("7.654.321-5"));
        assert!(!validate_rut("10.000.013-0")); // Should be K
        assert!(!validate_rut("11.111.111-K")); // Should be 1
        assert!(!validate_rut("765432-1")); // Too short
        assert!(!validate_rut("12A45678-5")); // Non-digit body
        assert!(!validate_rut(""));
    }

    #[test]
    fn test_validate_ignores_punctuation() {
        assert_eq!(validate_rut("7.654.321-6"), validate_rut("76543216"));
        assert_eq!(validate_rut("7.654.321-5"), validate_rut("76543215"));
        assert!(validate_rut("76543216"));
    }

    #[test]
    fn test_compute_check_char() {
        // 8*2 + 7*3 + 6*4 + 5*5 + 4*6 + 3*7 + 2*2 + 1*3 = 138; 11 - 138 % 11 = 5
        assert_eq!(compute_check_char("12345678"), Some('5'));
        assert_eq!(compute_check_char("7654321"), Some('6'));
        assert_eq!(compute_check_char("10000013"), Some('K'));
        assert_eq!(compute_check_char("10000004"), Some('0'));
        assert_eq!(compute_check_char("12.345"), None);
        assert_eq!(compute_check_char(""), None);
    }

    #[test]
    fn test_computed_check_char_validates() {
        for body in ["12345678", "7654321", "9876543", "22333444", "16000000"] {
            let check = compute_check_char(body).unwrap();
            assert!(validate_rut(&format!("{}-{}", body, check)), "body {}", body);
        }
    }

    #[test]
    fn test_extract_rut_dotted() {
        let text = "PACIENTE: JUANA PEREZ\nRUT 7.654.321-6\nEDAD 68";
        assert_eq!(extract_rut(text), Some("7.654.321-6".to_string()));
    }

    #[test]
    fn test_extract_rut_plain_uppercases_k() {
        let text = "RUT: 10000013-k";
        assert_eq!(extract_rut(text), Some("10000013-K".to_string()));
    }

    #[test]
    fn test_extract_rut_skips_failed_checksum() {
        let text = "RUT 12.345.678-9 / RUT TITULAR 11.222.333-9";
        assert_eq!(extract_rut(text), Some("11.222.333-9".to_string()));
    }

    #[test]
    fn test_extract_rut_without_validation() {
        let text = "RUT 12.345.678-9";
        assert_eq!(extract_rut(text), None);

        let extractor = RutExtractor::new().with_validation(false);
        let result = extractor.extract(text).unwrap();
        assert_eq!(result.value, "12.345.678-9");
        assert_eq!(result.position, Some((4, 16)));
    }

    #[test]
    fn test_extract_rut_ignores_longer_numbers() {
        assert_eq!(extract_rut("FICHA 123456789-5"), None);
    }

    #[test]
    fn test_format_rut() {
        assert_eq!(format_rut("76543216"), "7.654.321-6");
        assert_eq!(format_rut("12345678-5"), "12.345.678-5");
        assert_eq!(format_rut("10.000.013-k"), "10.000.013-K");
        assert_eq!(format_rut("abc"), "abc");
    }
}
