//! Admission form field extraction.

pub mod confidence;
mod parser;
pub mod report;
pub mod rules;

pub use parser::AdmissionFormParser;

use crate::models::intake::ParseResult;
use crate::models::recognized::{RecognizedText, TextBlock};

/// Trait for admission form parsing.
pub trait FormParser {
    /// Parse recognized text (transcript plus blocks).
    fn parse(&self, input: &RecognizedText) -> ParseResult;

    /// Parse a plain transcript with no block structure.
    fn parse_text(&self, text: &str) -> ParseResult {
        self.parse(&RecognizedText::from_text(text))
    }
}

/// Parse a transcript and its blocks with default settings.
///
/// Unlabelled dates are disambiguated against today's date.
pub fn parse(full_text: &str, blocks: &[TextBlock]) -> ParseResult {
    AdmissionFormParser::new().parse_parts(full_text, blocks)
}
