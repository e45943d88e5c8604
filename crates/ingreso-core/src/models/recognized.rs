//! Input model: the transcript produced by the text-recognition service.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single OCR fragment. May hold a label, a value, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Recognized text content.
    pub text: String,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Output of the text-recognition service for one form image.
///
/// Blocks are ordered as the recognizer emitted them and need not line up
/// one-to-one with the lines of `full_text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedText {
    /// Newline-delimited transcript.
    #[serde(default)]
    pub full_text: String,

    /// Ordered text fragments.
    #[serde(default)]
    pub blocks: Vec<TextBlock>,
}

impl RecognizedText {
    /// Create from a full transcript and its blocks.
    pub fn new(full_text: impl Into<String>, blocks: Vec<TextBlock>) -> Self {
        Self {
            full_text: full_text.into(),
            blocks,
        }
    }

    /// Create from a plain transcript with no block structure.
    pub fn from_text(full_text: impl Into<String>) -> Self {
        Self::new(full_text, Vec::new())
    }

    /// Parse the recognizer's JSON payload (`{"fullText": ..., "blocks": [{"text": ...}]}`).
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// True when there is nothing to extract from.
    pub fn is_empty(&self) -> bool {
        self.full_text.trim().is_empty() && self.blocks.iter().all(|b| b.text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_with_blocks() {
        let json = r#"{"fullText": "NOMBRE\nJUANA PEREZ", "blocks": [{"text": "NOMBRE"}, {"text": "JUANA PEREZ"}]}"#;
        let text = RecognizedText::from_json(json).unwrap();

        assert_eq!(text.full_text, "NOMBRE\nJUANA PEREZ");
        assert_eq!(text.blocks.len(), 2);
        assert_eq!(text.blocks[1], TextBlock::new("JUANA PEREZ"));
    }

    #[test]
    fn test_from_json_without_blocks() {
        let text = RecognizedText::from_json(r#"{"fullText": "CAMA: B204"}"#).unwrap();
        assert!(text.blocks.is_empty());
        assert!(!text.is_empty());
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(RecognizedText::from_json("{not json").is_err());
    }

    #[test]
    fn test_is_empty() {
        assert!(RecognizedText::from_text("").is_empty());
        assert!(RecognizedText::new("  \n ", vec![TextBlock::new(" ")]).is_empty());
    }
}
