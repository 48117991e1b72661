//! Rule-based field extractors for Brazilian fuel receipts.
//!
//! Every field is resolved by a [`Cascade`]: an ordered list of
//! [`PatternMatcher`]s where the first one producing a value wins. Matchers
//! are ordered from most reliable to most generic.

pub mod amounts;
pub mod datetime;
pub mod document;
pub mod fuel;
pub mod odometer;
pub mod patterns;
pub mod plate;
pub mod quantity;
pub mod vendor;

pub use amounts::{
    extract_total, extract_unit_price, parse_brl_amount, resolve_unlabeled_amounts,
    UnlabeledAmounts,
};
pub use datetime::extract_datetime;
pub use document::extract_receipt_number;
pub use fuel::{match_fuel_type, FuelTypeExtractor};
pub use odometer::extract_odometer;
pub use plate::{extract_plate, normalize_plate};
pub use quantity::extract_quantity;
pub use vendor::VendorExtractor;

use regex::{Captures, Regex};
use tracing::trace;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// A value together with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Name of the matcher that produced it.
    pub matcher: &'static str,
    /// Byte span of the captured value in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, matcher: &'static str, source: impl Into<String>) -> Self {
        Self {
            value,
            matcher,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// One regex plus the conversion of its captures into a value.
///
/// A conversion returning `None` (bad number, impossible date, out of range)
/// counts as a non-match for that occurrence; later occurrences of the same
/// pattern are still tried.
pub struct PatternMatcher<T> {
    pub name: &'static str,
    pub pattern: &'static Regex,
    pub convert: fn(&Captures<'_>) -> Option<T>,
}

impl<T> PatternMatcher<T> {
    pub fn new(
        name: &'static str,
        pattern: &'static Regex,
        convert: fn(&Captures<'_>) -> Option<T>,
    ) -> Self {
        Self {
            name,
            pattern,
            convert,
        }
    }

    /// Run this matcher alone.
    pub fn apply(&self, text: &str) -> Option<ExtractionMatch<T>> {
        for caps in self.pattern.captures_iter(text) {
            let Some(value) = (self.convert)(&caps) else {
                continue;
            };
            let Some(span) = caps.get(1).or_else(|| caps.get(0)) else {
                continue;
            };
            return Some(
                ExtractionMatch::new(value, self.name, span.as_str())
                    .with_position(span.start(), span.end()),
            );
        }
        None
    }
}

/// Ordered matchers for one field.
pub struct Cascade<T> {
    field: &'static str,
    matchers: Vec<PatternMatcher<T>>,
}

impl<T> Cascade<T> {
    pub fn new(field: &'static str, matchers: Vec<PatternMatcher<T>>) -> Self {
        Self { field, matchers }
    }
}

impl<T> FieldExtractor for Cascade<T> {
    type Output = ExtractionMatch<T>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let found = self.matchers.iter().find_map(|m| m.apply(text));
        if let Some(m) = &found {
            trace!("{}: matched {:?} via {}", self.field, m.source, m.matcher);
        }
        found
    }
}

/// Convert the first capture group with `parse`.
pub(crate) fn first_group<T>(caps: &Captures<'_>, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    caps.get(1).and_then(|m| parse(m.as_str()))
}
