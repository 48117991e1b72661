//! Dispensed quantity extraction (liters, or kg for compressed gas).

use lazy_static::lazy_static;
use regex::Captures;
use rust_decimal::Decimal;

use super::amounts::parse_brl_amount;
use super::patterns::{
    KG_DECIMAL, KG_INTEGER, LITERS_DECIMAL, LITERS_INTEGER, LITERS_LABEL, QUANTITY_QTDE,
    QUANTITY_QUANTIDADE,
};
use super::{first_group, Cascade, ExtractionMatch, FieldExtractor, PatternMatcher};

lazy_static! {
    static ref QUANTITY: Cascade<Decimal> = Cascade::new(
        "quantity_liters",
        vec![
            PatternMatcher::new("qtde", &QUANTITY_QTDE, quantity),
            PatternMatcher::new("quantidade", &QUANTITY_QUANTIDADE, quantity),
            PatternMatcher::new("liters_decimal", &LITERS_DECIMAL, quantity),
            PatternMatcher::new("liters_integer", &LITERS_INTEGER, quantity),
            PatternMatcher::new("litros_label", &LITERS_LABEL, quantity),
            PatternMatcher::new("kg_decimal", &KG_DECIMAL, quantity),
            PatternMatcher::new("kg_integer", &KG_INTEGER, quantity),
        ],
    );
}

fn quantity(caps: &Captures<'_>) -> Option<Decimal> {
    first_group(caps, parse_brl_amount).filter(|q| !q.is_sign_negative())
}

/// Extract the dispensed quantity.
pub fn extract_quantity(text: &str) -> Option<ExtractionMatch<Decimal>> {
    QUANTITY.extract(text)
}
