//! Vehicle plate extraction (Brazilian old and Mercosul formats).

use lazy_static::lazy_static;
use regex::Captures;

use super::patterns::{PLATE_MERCOSUL, PLATE_OLD, PLATE_SHAPE, PLATE_VEICULO_PLACA};
use super::{first_group, Cascade, ExtractionMatch, FieldExtractor, PatternMatcher};

lazy_static! {
    static ref PLATE: Cascade<String> = Cascade::new(
        "vehicle_plate",
        vec![
            PatternMatcher::new("veiculo_placa", &PLATE_VEICULO_PLACA, plate),
            PatternMatcher::new("placa_mercosul", &PLATE_MERCOSUL, plate),
            PatternMatcher::new("placa_old", &PLATE_OLD, plate),
        ],
    );
}

fn plate(caps: &Captures<'_>) -> Option<String> {
    first_group(caps, normalize_plate)
}

/// Strip separators and uppercase; `None` unless the result is a valid
/// 7-character plate (`ABC1234` or `ABC1D23`).
pub fn normalize_plate(raw: &str) -> Option<String> {
    let plate: String = raw
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    (plate.chars().count() == 7 && PLATE_SHAPE.is_match(&plate)).then_some(plate)
}

/// Extract a label-anchored vehicle plate.
pub fn extract_plate(text: &str) -> Option<ExtractionMatch<String>> {
    PLATE.extract(text)
}
