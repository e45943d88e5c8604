//! Core library for hospital admission form extraction.
//!
//! This crate provides:
//! - Recognized-text input model (full transcript plus OCR blocks)
//! - Rule-based field extraction (name, RUT, age, prevision, admission date, bed)
//! - RUT modulo-11 checksum validation
//! - Per-field confidence scoring and review warnings
//!
//! Parsing is pure and synchronous: no I/O, no shared mutable state.

pub mod error;
pub mod form;
pub mod models;

pub use error::{IngresoError, Result};
pub use form::{parse, AdmissionFormParser, FormParser};
pub use models::config::IngresoConfig;
pub use models::intake::{ConfidenceMap, ExtractedFields, Field, FieldValue, FieldWarning, ParseResult};
pub use models::recognized::{RecognizedText, TextBlock};
