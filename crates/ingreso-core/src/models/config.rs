//! Configuration structures for the extraction pipeline.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{IngresoError, Result};

/// Main configuration for ingreso.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngresoConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Discard RUT candidates whose check digit does not match.
    pub validate_rut: bool,

    /// Fields scoring below this (and above zero) are flagged for review.
    pub review_threshold: f32,

    /// Date used to disambiguate unlabelled dates. `None` means today.
    pub reference_date: Option<NaiveDate>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            validate_rut: true,
            review_threshold: 0.90,
            reference_date: None,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl IngresoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.extraction.review_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(IngresoError::Config(format!(
                "extraction.review_threshold must be within 0..1, got {}",
                threshold
            )));
        }
        Ok(())
    }
}
