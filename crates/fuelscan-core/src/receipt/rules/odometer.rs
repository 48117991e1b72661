//! Odometer reading extraction.

use lazy_static::lazy_static;
use regex::Captures;

use super::patterns::{ODOMETER_KM, ODOMETER_ODOMETRO, ODOMETER_QUILOMETRAGEM};
use super::{first_group, Cascade, ExtractionMatch, FieldExtractor, PatternMatcher};

/// Highest reading a 7-digit odometer can show.
pub const MAX_ODOMETER_KM: u32 = 9_999_999;

lazy_static! {
    static ref ODOMETER: Cascade<u32> = Cascade::new(
        "odometer_km",
        vec![
            PatternMatcher::new("km", &ODOMETER_KM, reading),
            PatternMatcher::new("odometro", &ODOMETER_ODOMETRO, reading),
            PatternMatcher::new("quilometragem", &ODOMETER_QUILOMETRAGEM, reading),
        ],
    );
}

fn reading(caps: &Captures<'_>) -> Option<u32> {
    first_group(caps, |digits| {
        digits.parse::<u32>().ok().filter(|km| *km <= MAX_ODOMETER_KM)
    })
}

/// Extract a label-anchored odometer reading in km.
pub fn extract_odometer(text: &str) -> Option<ExtractionMatch<u32>> {
    ODOMETER.extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn value(text: &str) -> Option<u32> {
        extract_odometer(text).map(|m| m.value)
    }

    #[test]
    fn test_km_label() {
        assert_eq!(value("KM: 508870"), Some(508870));
        assert_eq!(value("km 1234567"), Some(1234567));
    }

    #[test]
    fn test_eight_digits_rejected() {
        assert_eq!(value("KM: 99999999"), None);
    }

    #[test]
    fn test_other_labels() {
        assert_eq!(value("Odômetro: 45210"), Some(45210));
        assert_eq!(value("ODOMETRO 987"), Some(987));
        assert_eq!(value("Quilometragem: 120500"), Some(120500));
    }

    #[test]
    fn test_too_short() {
        assert_eq!(value("KM 12"), None);
    }
}
