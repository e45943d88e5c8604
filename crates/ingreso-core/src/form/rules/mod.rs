//! Rule-based field extractors for admission forms.

pub mod age;
pub mod bed;
pub mod dates;
pub mod name;
pub mod patterns;
pub mod prevision;
pub mod rut;

pub use age::{extract_age, AgeExtractor};
pub use bed::{extract_bed, BedExtractor};
pub use dates::{extract_admission_date, AdmissionDateExtractor, DateToken};
pub use name::{extract_name, NameExtractor};
pub use prevision::{extract_prevision, lookup_prevision, PrevisionExtractor};
pub use rut::{compute_check_char, extract_rut, format_rut, validate_rut, RutExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all acceptable candidates, in the order they would be tried.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched candidate with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
