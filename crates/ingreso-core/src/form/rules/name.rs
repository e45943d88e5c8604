//! Patient name extraction.
//!
//! Labelled OCR blocks are the most reliable source; flat-text patterns are
//! the fallback. Every candidate is truncated at the first field delimiter
//! word, stripped of administrative phrases, and then validated.

use tracing::trace;

use crate::models::recognized::TextBlock;

use super::patterns::{
    NAME_BLOCK_LABEL, NAME_DELIMITER, NAME_DENYLIST, NAME_DENYLIST_PATTERN, NAME_LABELED,
    NAME_UPPERCASE_LINE,
};
use super::{ExtractionMatch, FieldExtractor};

/// Shortest accepted name, in characters.
const MIN_NAME_LEN: usize = 5;

/// How many blocks after a bare label may hold the value.
const LOOKAHEAD_BLOCKS: usize = 2;

/// Name field extractor.
pub struct NameExtractor;

impl NameExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Find a name next to a label block ("Nombre", "Paciente", "Titular", ...).
    ///
    /// A value in the label's own block (`NOMBRE: JUANA PEREZ`) is tried
    /// first, then up to two following blocks.
    pub fn extract_from_blocks(&self, blocks: &[TextBlock]) -> Option<String> {
        for (i, block) in blocks.iter().enumerate() {
            let Some(caps) = NAME_BLOCK_LABEL.captures(&block.text) else {
                continue;
            };

            let trailing = caps.get(1).map_or("", |m| m.as_str());
            if !trailing.trim().is_empty() {
                if let Some(name) = clean_name(trailing) {
                    return Some(name);
                }
            }

            for next in blocks.iter().skip(i + 1).take(LOOKAHEAD_BLOCKS) {
                if let Some(name) = clean_name(&next.text) {
                    return Some(name);
                }
            }
        }

        None
    }
}

impl Default for NameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for NameExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// Flat-text candidates: labelled values first, then bare all-caps lines.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for caps in NAME_LABELED.captures_iter(text) {
            let value = caps.get(1).unwrap();
            if let Some(name) = clean_name(value.as_str()) {
                if !results.iter().any(|r| r.value == name) {
                    results.push(
                        ExtractionMatch::new(name, value.as_str())
                            .with_position(value.start(), value.end()),
                    );
                }
            }
        }

        let mut offset = 0;
        for line in text.split('\n') {
            let start = offset;
            offset += line.len() + 1;

            let trimmed = line.trim();
            if !NAME_UPPERCASE_LINE.is_match(trimmed) {
                continue;
            }

            if let Some(name) = clean_name(trimmed) {
                if !results.iter().any(|r| r.value == name) {
                    results.push(
                        ExtractionMatch::new(name, trimmed).with_position(start, start + line.len()),
                    );
                }
            }
        }

        results
    }
}

/// Truncate, strip and validate a raw candidate.
pub fn clean_name(raw: &str) -> Option<String> {
    let truncated = match NAME_DELIMITER.find(raw) {
        Some(m) => &raw[..m.start()],
        None => raw,
    };

    let stripped = NAME_DENYLIST_PATTERN.replace_all(truncated, " ");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    let candidate = collapsed.trim_matches(|c: char| !c.is_alphanumeric());

    if is_valid_name(candidate) {
        Some(candidate.to_string())
    } else {
        trace!("Rejected name candidate {:?}", raw.trim());
        None
    }
}

/// Validity filter applied to every name candidate.
pub fn is_valid_name(candidate: &str) -> bool {
    if candidate.chars().count() < MIN_NAME_LEN {
        return false;
    }

    if candidate.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    // A colon left inside means another label ("NOMBRE DEL PADRE: ...") was read as the value
    if candidate.contains(':') {
        return false;
    }

    let upper = candidate.to_uppercase();
    if NAME_DENYLIST.iter().any(|phrase| upper.contains(phrase)) {
        return false;
    }

    candidate.split_whitespace().count() >= 2
}

/// Extract the patient name, preferring block structure over flat text.
pub fn extract_name(text: &str, blocks: &[TextBlock]) -> Option<String> {
    let extractor = NameExtractor::new();

    extractor
        .extract_from_blocks(blocks)
        .or_else(|| extractor.extract(text).map(|m| m.value))
}
