//! Bed / room extraction.

use regex::Regex;
use tracing::trace;

use super::patterns::{BED_BARE, BED_ID_LIKE, BED_LABELED, BED_PIEZA};
use super::{ExtractionMatch, FieldExtractor};

/// Longest accepted bed identifier.
const MAX_BED_LEN: usize = 6;

/// Bed field extractor.
///
/// Strategies run in a fixed order: labelled field (Cama/Pieza/Habitación,
/// separator optional), bare ward-code token such as `IA252`, then
/// `PIEZA <token>`. Reordering them changes which token wins on noisy forms.
pub struct BedExtractor;

impl BedExtractor {
    pub fn new() -> Self {
        Self
    }

    fn strategies() -> [&'static Regex; 3] {
        [&*BED_LABELED, &*BED_BARE, &*BED_PIEZA]
    }
}

impl Default for BedExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for BedExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        for pattern in Self::strategies() {
            for caps in pattern.captures_iter(text) {
                if let Some(m) = accept(&caps) {
                    return Some(m);
                }
            }
        }

        None
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for pattern in Self::strategies() {
            for caps in pattern.captures_iter(text) {
                if let Some(m) = accept(&caps) {
                    if !results.iter().any(|r| r.value == m.value) {
                        results.push(m);
                    }
                }
            }
        }

        results
    }
}

fn accept(caps: &regex::Captures<'_>) -> Option<ExtractionMatch<String>> {
    let full_match = caps.get(0).unwrap();
    let candidate = caps[1].to_uppercase();

    if !is_acceptable_bed(&candidate) {
        trace!("Discarding bed candidate {:?}", candidate);
        return None;
    }

    Some(
        ExtractionMatch::new(candidate, full_match.as_str())
            .with_position(full_match.start(), full_match.end()),
    )
}

/// Reject tokens that look like a misfired ID match or are too long.
pub fn is_acceptable_bed(candidate: &str) -> bool {
    !candidate.is_empty()
        && !BED_ID_LIKE.is_match(candidate)
        && candidate.chars().count() <= MAX_BED_LEN
}

/// Extract the bed identifier from text, upper-cased.
pub fn extract_bed(text: &str) -> Option<String> {
    BedExtractor::new().extract(text).map(|m| m.value)
}
