//! Receipt parser running every field cascade over the raw text.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::receipt::ReceiptFields;

use super::rules::{
    extract_datetime, extract_odometer, extract_plate, extract_quantity, extract_receipt_number,
    extract_total, extract_unit_price, resolve_unlabeled_amounts, FieldExtractor,
    FuelTypeExtractor, VendorExtractor,
};

/// Turns noisy receipt text into typed fields.
///
/// Each field is extracted independently. A field no matcher recognizes is
/// left as `None`; parsing itself never fails.
#[derive(Debug, Clone)]
pub struct ReceiptParser {
    vendor: VendorExtractor,
    fuel: FuelTypeExtractor,
    unit_price_ceiling: Decimal,
}

impl ReceiptParser {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            vendor: VendorExtractor::from_config(config),
            fuel: FuelTypeExtractor,
            unit_price_ceiling: config.unit_price_ceiling,
        }
    }

    /// Parse fields from receipt text.
    pub fn parse(&self, text: &str) -> ReceiptFields {
        let quantity = extract_quantity(text);
        let unit_price = extract_unit_price(text);
        let total = extract_total(text);

        let mut fields = ReceiptFields {
            vendor_name: self.vendor.extract(text),
            transaction_datetime: extract_datetime(text).map(|m| m.value),
            quantity_liters: quantity.as_ref().map(|m| m.value),
            unit_price: unit_price.as_ref().map(|m| m.value),
            total_amount: total.as_ref().map(|m| m.value),
            fuel_type: self.fuel.extract(text),
            receipt_number: extract_receipt_number(text).map(|m| m.value),
            vehicle_plate: extract_plate(text).map(|m| m.value),
            odometer_km: extract_odometer(text).map(|m| m.value),
        };

        if fields.unit_price.is_none() || fields.total_amount.is_none() {
            let claimed: Vec<(usize, usize)> = [quantity.as_ref(), unit_price.as_ref(), total.as_ref()]
                .into_iter()
                .flatten()
                .filter_map(|m| m.position)
                .collect();

            let guessed = resolve_unlabeled_amounts(text, &claimed, self.unit_price_ceiling);
            if fields.unit_price.is_none() && guessed.unit_price.is_some() {
                debug!("unit_price taken from unlabeled amount {:?}", guessed.unit_price);
                fields.unit_price = guessed.unit_price;
            }
            if fields.total_amount.is_none() && guessed.total.is_some() {
                debug!("total_amount taken from unlabeled amount {:?}", guessed.total);
                fields.total_amount = guessed.total;
            }
        }

        let completeness = fields.completeness();
        debug!(
            "Parsed receipt: {}/{} key fields",
            completeness.found, completeness.total
        );

        fields
    }
}

impl Default for ReceiptParser {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::FuelType;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const NFCE_RECEIPT: &str = "\
AUTO POSTO ESTRELA DO SUL LTDA
CNPJ: 12.345.678/0001-90
Av. Brasil, 1500 - Centro
NFC-e: 000893951 Serie 1
Emissao: 15/01/2024 14:32:07
DIESEL S10 COMUM
Qtde.: 42,375 Vl. Unit.: 5,899
Vl. Total R$ 249,97
PLACA: ABC1D23
KM: 508870
";

    #[test]
    fn test_full_receipt() {
        let fields = ReceiptParser::default().parse(NFCE_RECEIPT);

        assert_eq!(
            fields,
            ReceiptFields {
                vendor_name: Some("AUTO POSTO ESTRELA DO SUL LTDA".to_string()),
                transaction_datetime: Some(
                    NaiveDate::from_ymd_opt(2024, 1, 15)
                        .unwrap()
                        .and_hms_opt(14, 32, 7)
                        .unwrap()
                ),
                quantity_liters: Some(dec("42.375")),
                unit_price: Some(dec("5.899")),
                total_amount: Some(dec("249.97")),
                fuel_type: Some(FuelType::Diesel),
                receipt_number: Some("000893951".to_string()),
                vehicle_plate: Some("ABC1D23".to_string()),
                odometer_km: Some(508870),
            }
        );
        assert!(fields.completeness().is_complete());
    }

    #[test]
    fn test_quantity_and_price_without_total() {
        let fields = ReceiptParser::default().parse("Qtde.:29,24\nVl. Unit.: 6,84");
        assert_eq!(fields.quantity_liters, Some(dec("29.24")));
        assert_eq!(fields.unit_price, Some(dec("6.84")));
        // The quantity token is claimed and cannot double as the total.
        assert_eq!(fields.total_amount, None);
    }

    #[test]
    fn test_unlabeled_amounts_fill_missing_fields() {
        let text = "POSTO BOA VIAGEM\nGASOLINA COMUM 30,00 L\n6,49\nR$ 194,70";
        let fields = ReceiptParser::default().parse(text);
        assert_eq!(fields.quantity_liters, Some(dec("30.00")));
        assert_eq!(fields.unit_price, Some(dec("6.49")));
        assert_eq!(fields.total_amount, Some(dec("194.70")));
        assert_eq!(fields.fuel_type, Some(FuelType::Gasoline));
    }

    #[test]
    fn test_labeled_total_is_not_overridden() {
        let text = "TOTAL R$ 120,00\n300,00";
        let fields = ReceiptParser::default().parse(text);
        assert_eq!(fields.total_amount, Some(dec("120.00")));
        assert_eq!(fields.unit_price, None);
    }

    #[test]
    fn test_custom_ceiling() {
        let config = ExtractionConfig {
            unit_price_ceiling: Decimal::from(5),
            ..ExtractionConfig::default()
        };
        let fields = ReceiptParser::new(&config).parse("6,49\n2,10");
        assert_eq!(fields.unit_price, Some(dec("2.10")));
        assert_eq!(fields.total_amount, Some(dec("6.49")));
    }

    #[test]
    fn test_no_fuel_keyword_defaults_to_diesel() {
        let fields = ReceiptParser::default().parse("CONVENIENCIA\nAGUA MINERAL 3,50");
        assert_eq!(fields.fuel_type, Some(FuelType::Diesel));
    }

    #[test]
    fn test_empty_text() {
        let fields = ReceiptParser::default().parse("");
        assert_eq!(
            fields,
            ReceiptFields {
                fuel_type: Some(FuelType::Diesel),
                ..ReceiptFields::default()
            }
        );
        assert!(fields.completeness().is_empty());
    }
}
