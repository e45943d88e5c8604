//! Admission date extraction.
//!
//! Forms usually carry a birth date and an admission date. A date next to an
//! admission label wins; otherwise the date closest to the reference date
//! (today, by default) is taken as the admission date.

use chrono::{Days, Local, NaiveDate};
use tracing::trace;

use super::patterns::{DATE_DMY, DATE_LABELED};
use super::{ExtractionMatch, FieldExtractor};

/// A day/month/year triple as written on the form.
///
/// Not necessarily a real calendar date (31/02 passes the range checks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateToken {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl DateToken {
    /// Build from captured digits, rejecting out-of-range day or month.
    pub fn parse(day: &str, month: &str, year: &str) -> Option<Self> {
        let day: u32 = day.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        let year: i32 = year.parse().ok()?;

        if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            return None;
        }

        Some(Self { day, month, year })
    }

    /// Render as `DD/MM/YYYY`.
    pub fn format(&self) -> String {
        format!("{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }

    /// Calendar date, letting overflowing days roll into the next month.
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)?
            .checked_add_days(Days::new(u64::from(self.day - 1)))
    }

    /// Absolute distance in days to `reference`.
    pub fn distance_days(&self, reference: NaiveDate) -> Option<i64> {
        self.to_date()
            .map(|date| (date - reference).num_days().abs())
    }
}

/// Admission date extractor.
pub struct AdmissionDateExtractor {
    reference: NaiveDate,
}

impl AdmissionDateExtractor {
    /// Create an extractor that disambiguates against today's date.
    pub fn new() -> Self {
        Self {
            reference: Local::now().date_naive(),
        }
    }

    /// Set the date unlabelled candidates are compared against.
    pub fn with_reference_date(mut self, reference: NaiveDate) -> Self {
        self.reference = reference;
        self
    }

    /// Dates written right after an admission label, in text order.
    pub fn extract_labeled(&self, text: &str) -> Vec<ExtractionMatch<DateToken>> {
        DATE_LABELED
            .captures_iter(text)
            .filter_map(|caps| {
                let full_match = caps.get(0).unwrap();
                let token = DateToken::parse(&caps[1], &caps[2], &caps[3])?;
                Some(
                    ExtractionMatch::new(token, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }

    /// Every plausible date token in the text, in text order.
    pub fn extract_candidates(&self, text: &str) -> Vec<ExtractionMatch<DateToken>> {
        DATE_DMY
            .captures_iter(text)
            .filter_map(|caps| {
                let full_match = caps.get(0).unwrap();
                let token = DateToken::parse(&caps[1], &caps[2], &caps[3]);

                match token {
                    Some(token) if token.year >= 1900 => Some(
                        ExtractionMatch::new(token, full_match.as_str())
                            .with_position(full_match.start(), full_match.end()),
                    ),
                    _ => {
                        trace!("Discarding date candidate {:?}", full_match.as_str());
                        None
                    }
                }
            })
            .collect()
    }
}

impl Default for AdmissionDateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AdmissionDateExtractor {
    type Output = ExtractionMatch<DateToken>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        if let Some(labeled) = self.extract_labeled(text).into_iter().next() {
            return Some(labeled);
        }

        // min_by_key keeps the first of equally close candidates
        self.extract_candidates(text)
            .into_iter()
            .filter_map(|m| m.value.distance_days(self.reference).map(|d| (d, m)))
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, m)| m)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = self.extract_labeled(text);

        for m in self.extract_candidates(text) {
            if !results.iter().any(|r| r.value == m.value) {
                results.push(m);
            }
        }

        results
    }
}

/// Extract the admission date as `DD/MM/YYYY`, disambiguating against `reference`.
pub fn extract_admission_date(text: &str, reference: NaiveDate) -> Option<String> {
    AdmissionDateExtractor::new()
        .with_reference_date(reference)
        .extract(text)
        .map(|m| m.value.format())
}
