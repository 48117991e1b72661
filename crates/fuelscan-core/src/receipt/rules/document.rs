//! Receipt number extraction (NFC-e, cupom, COO, ...).

use lazy_static::lazy_static;
use regex::Captures;

use super::patterns::{
    RECEIPT_COO, RECEIPT_CUPOM, RECEIPT_DOCUMENTO, RECEIPT_NF, RECEIPT_NFCE, RECEIPT_NOTA_FISCAL,
    RECEIPT_NUMERO,
};
use super::{first_group, Cascade, ExtractionMatch, FieldExtractor, PatternMatcher};

/// Receipt numbers are 5 to 10 digits; CNPJs (14) and access keys (44) are
/// longer and must not be mistaken for one.
const MIN_DIGITS: usize = 5;
const MAX_DIGITS: usize = 10;

lazy_static! {
    static ref RECEIPT_NUMBER: Cascade<String> = Cascade::new(
        "receipt_number",
        vec![
            PatternMatcher::new("numero", &RECEIPT_NUMERO, receipt_number),
            PatternMatcher::new("nfce", &RECEIPT_NFCE, receipt_number),
            PatternMatcher::new("cupom", &RECEIPT_CUPOM, receipt_number),
            PatternMatcher::new("nota_fiscal", &RECEIPT_NOTA_FISCAL, receipt_number),
            PatternMatcher::new("coo", &RECEIPT_COO, receipt_number),
            PatternMatcher::new("documento", &RECEIPT_DOCUMENTO, receipt_number),
            PatternMatcher::new("nf", &RECEIPT_NF, receipt_number),
        ],
    );
}

fn receipt_number(caps: &Captures<'_>) -> Option<String> {
    first_group(caps, |digits| {
        (MIN_DIGITS..=MAX_DIGITS)
            .contains(&digits.len())
            .then(|| digits.to_string())
    })
}

/// Extract the receipt number, keeping leading zeros.
pub fn extract_receipt_number(text: &str) -> Option<ExtractionMatch<String>> {
    RECEIPT_NUMBER.extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn value(text: &str) -> Option<String> {
        extract_receipt_number(text).map(|m| m.value)
    }

    #[test]
    fn test_nfce_keeps_leading_zeros() {
        assert_eq!(value("NFC-e: 000893951"), Some("000893951".to_string()));
        assert_eq!(value("NFCe nº 123456 Série 1"), Some("123456".to_string()));
    }

    #[test]
    fn test_labels() {
        assert_eq!(value("Número: 48213"), Some("48213".to_string()));
        assert_eq!(value("CUPOM FISCAL Nº 0012345"), Some("0012345".to_string()));
        assert_eq!(value("Nota Fiscal 7654321"), Some("7654321".to_string()));
        assert_eq!(value("COO:045123"), Some("045123".to_string()));
        assert_eq!(value("Documento 99887"), Some("99887".to_string()));
        assert_eq!(value("NF-556677"), Some("556677".to_string()));
    }

    #[test]
    fn test_label_priority() {
        let m = extract_receipt_number("COO: 111111\nNúmero: 222222").unwrap();
        assert_eq!(m.value, "222222");
        assert_eq!(m.matcher, "numero");
    }

    #[test]
    fn test_length_bounds() {
        // Too short and access-key length are both rejected.
        assert_eq!(value("COO: 1234"), None);
        assert_eq!(value("NFC-e 35240612345678000190650010000012341000012345"), None);
    }

    #[test]
    fn test_long_capture_falls_through_to_next_label() {
        let text = "Número 12345678901234\nCOO: 004512";
        assert_eq!(value(text), Some("004512".to_string()));
    }
}
