//! Insurance plan ("previsión") mapping.

use tracing::trace;

use super::patterns::{FONASA, PREVISION_LABELED, PREVISION_SYNONYMS};
use super::{ExtractionMatch, FieldExtractor};

/// Insurance plan extractor.
///
/// A labelled field (ASEGURADOR / PLAN, ASEGURADOR, PREVISIÓN) takes
/// precedence; otherwise the whole text is scanned for any known insurer
/// name in table order.
pub struct PrevisionExtractor;

impl PrevisionExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_labeled(&self, text: &str) -> Option<ExtractionMatch<String>> {
        for caps in PREVISION_LABELED.captures_iter(text) {
            let value = &caps[1];
            let normalized = normalize(value);

            let plan = if normalized.contains("FONASA") {
                Some(FONASA)
            } else {
                lookup_prevision(&normalized).or_else(|| {
                    if normalized.contains("ISAPRE") {
                        lookup_prevision(&normalize(&normalized.replace("ISAPRE", " ")))
                    } else {
                        None
                    }
                })
            };

            match plan {
                Some(plan) => {
                    let full_match = caps.get(0).unwrap();
                    return Some(
                        ExtractionMatch::new(plan.to_string(), value)
                            .with_position(full_match.start(), full_match.end()),
                    );
                }
                None => trace!("Unrecognized labelled insurer {:?}", value),
            }
        }

        None
    }

    fn scan(&self, text: &str) -> Vec<ExtractionMatch<String>> {
        let upper = text.to_uppercase();
        let mut results: Vec<ExtractionMatch<String>> = Vec::new();

        for (key, plan) in PREVISION_SYNONYMS {
            if !upper.contains(key) || results.iter().any(|r| r.value == *plan) {
                continue;
            }
            results.push(ExtractionMatch::new(plan.to_string(), *key));
        }

        results
    }
}

impl Default for PrevisionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PrevisionExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_labeled(text)
            .or_else(|| self.scan(text).into_iter().next())
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = self.extract_labeled(text).into_iter().collect();

        for m in self.scan(text) {
            if !results.iter().any(|r| r.value == m.value) {
                results.push(m);
            }
        }

        results
    }
}

/// Look up a raw insurer token in the synonym table (exact match after normalization).
pub fn lookup_prevision(raw: &str) -> Option<&'static str> {
    let normalized = normalize(raw);
    PREVISION_SYNONYMS
        .iter()
        .find(|(key, _)| *key == normalized)
        .map(|(_, plan)| *plan)
}

/// Extract the canonical insurance plan from text.
pub fn extract_prevision(text: &str) -> Option<String> {
    PrevisionExtractor::new().extract(text).map(|m| m.value)
}

/// Upper-case, collapse whitespace and trim surrounding punctuation.
fn normalize(raw: &str) -> String {
    raw.to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}
