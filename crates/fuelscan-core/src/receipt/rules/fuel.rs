//! Fuel type detection by keyword.

use tracing::trace;

use super::FieldExtractor;
use crate::models::receipt::FuelType;

/// Keyword sets per category, checked in this order.
const FUEL_KEYWORDS: &[(FuelType, &[&str])] = &[
    (
        FuelType::Diesel,
        &["diesel", "dies", "oleo", "óleo", "s10", "s-10", "s500", "s5000"],
    ),
    (FuelType::Gasoline, &["gasolina", "gas comum", "gasol"]),
    (FuelType::Ethanol, &["etanol", "alcool", "álcool"]),
    (
        FuelType::CompressedGas,
        &["gnv", "gas natural", "gás natural"],
    ),
    (FuelType::UreaAdditive, &["arla", "arla 32", "arla32"]),
];

/// First category with a keyword contained in the lowercased text.
pub fn match_fuel_type(text: &str) -> Option<FuelType> {
    let lower = text.to_lowercase();
    FUEL_KEYWORDS.iter().find_map(|(fuel, keywords)| {
        keywords
            .iter()
            .find(|k| lower.contains(*k))
            .map(|k| {
                trace!("fuel_type: keyword {:?} -> {}", k, fuel);
                *fuel
            })
    })
}

/// Fuel type extractor; falls back to diesel, the fleet default.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuelTypeExtractor;

impl FieldExtractor for FuelTypeExtractor {
    type Output = FuelType;

    fn extract(&self, text: &str) -> Option<FuelType> {
        Some(match_fuel_type(text).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_categories() {
        assert_eq!(match_fuel_type("DIESEL S10 COMUM"), Some(FuelType::Diesel));
        assert_eq!(match_fuel_type("Óleo Diesel"), Some(FuelType::Diesel));
        assert_eq!(match_fuel_type("GASOLINA COMUM"), Some(FuelType::Gasoline));
        assert_eq!(match_fuel_type("ETANOL HIDRATADO"), Some(FuelType::Ethanol));
        assert_eq!(match_fuel_type("Álcool"), Some(FuelType::Ethanol));
        assert_eq!(match_fuel_type("GNV 12,5 kg"), Some(FuelType::CompressedGas));
        assert_eq!(match_fuel_type("ARLA 32 20 L"), Some(FuelType::UreaAdditive));
    }

    #[test]
    fn test_first_category_wins() {
        // Both diesel and ARLA present: diesel is checked first.
        assert_eq!(
            match_fuel_type("ARLA 32\nDIESEL S500"),
            Some(FuelType::Diesel)
        );
    }

    #[test]
    fn test_no_keyword() {
        assert_eq!(match_fuel_type("TOTAL R$ 100,00"), None);
    }

    #[test]
    fn test_extractor_defaults_to_diesel() {
        let extractor = FuelTypeExtractor;
        assert_eq!(
            extractor.extract("CONVENIENCIA AGUA MINERAL"),
            Some(FuelType::Diesel)
        );
        assert_eq!(extractor.extract("ETANOL"), Some(FuelType::Ethanol));
    }
}
