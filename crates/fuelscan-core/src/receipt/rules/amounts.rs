//! Unit price and total amount extraction.

use lazy_static::lazy_static;
use regex::Captures;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{
    CURRENCY_TOKEN, TOTAL_LABEL, TOTAL_VALOR_A_PAGAR, TOTAL_VALOR_PAGO, TOTAL_VL_TOTAL,
    UNIT_PRICE_PER_LITER, UNIT_PRICE_VALOR_UNIT, UNIT_PRICE_VL_UNIT,
};
use super::{first_group, Cascade, ExtractionMatch, FieldExtractor, PatternMatcher};

lazy_static! {
    static ref UNIT_PRICE: Cascade<Decimal> = Cascade::new(
        "unit_price",
        vec![
            PatternMatcher::new("vl_unit", &UNIT_PRICE_VL_UNIT, amount),
            PatternMatcher::new("preco_litro", &UNIT_PRICE_PER_LITER, amount),
            PatternMatcher::new("valor_unit", &UNIT_PRICE_VALOR_UNIT, amount),
        ],
    );

    static ref TOTAL: Cascade<Decimal> = Cascade::new(
        "total_amount",
        vec![
            PatternMatcher::new("vl_total", &TOTAL_VL_TOTAL, amount),
            PatternMatcher::new("valor_pago", &TOTAL_VALOR_PAGO, amount),
            PatternMatcher::new("valor_a_pagar", &TOTAL_VALOR_A_PAGAR, amount),
            PatternMatcher::new("total", &TOTAL_LABEL, amount),
        ],
    );
}

fn amount(caps: &Captures<'_>) -> Option<Decimal> {
    first_group(caps, parse_brl_amount)
}

/// Label-anchored unit price (`Vl. Unit.`, `Preço/Litro`, `Valor Unit`).
pub fn extract_unit_price(text: &str) -> Option<ExtractionMatch<Decimal>> {
    UNIT_PRICE.extract(text)
}

/// Label-anchored total (`Vl. Total`, `Valor pago`, `Valor a pagar`, `Total`).
pub fn extract_total(text: &str) -> Option<ExtractionMatch<Decimal>> {
    TOTAL.extract(text)
}

/// Values picked from unlabeled currency tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlabeledAmounts {
    pub unit_price: Option<Decimal>,
    pub total: Option<Decimal>,
}

/// Guess unit price and total from every currency-looking token in the text.
///
/// Tokens overlapping a `claimed` span (values already read by a labeled
/// matcher) are skipped, as are fragments of longer numbers such as CNPJs,
/// access keys and dotted dates. The smallest value below `ceiling` is the
/// unit price; the smallest value at or above it is the total.
pub fn resolve_unlabeled_amounts(
    text: &str,
    claimed: &[(usize, usize)],
    ceiling: Decimal,
) -> UnlabeledAmounts {
    let mut values: Vec<Decimal> = CURRENCY_TOKEN
        .captures_iter(text)
        .filter_map(|caps| {
            let number = caps.get(2)?;
            let (start, end) = (number.start(), number.end());
            if claimed.iter().any(|&(s, e)| start < e && s < end) {
                return None;
            }
            if !is_isolated(text, start, end) {
                return None;
            }
            parse_brl_amount(number.as_str())
        })
        .collect();

    values.sort();

    UnlabeledAmounts {
        unit_price: values.iter().copied().find(|v| *v < ceiling),
        total: values.iter().copied().find(|v| *v >= ceiling),
    }
}

/// True unless the token continues into a longer number on either side,
/// e.g. `12.345` inside `12.345.678/0001-90`.
fn is_isolated(text: &str, start: usize, end: usize) -> bool {
    let joins_number = |sep: Option<char>, next: Option<char>| {
        matches!(sep, Some('.' | ',' | '/' | '-')) && next.is_some_and(|c| c.is_ascii_digit())
    };

    let mut after = text[end..].chars();
    let mut before = text[..start].chars().rev();

    !joins_number(after.next(), after.next()) && !joins_number(before.next(), before.next())
}

/// Parse a Brazilian-formatted amount (e.g., "1.234,56", "6,84" or "200.04").
pub fn parse_brl_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // 1.234,56
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        // 1,234.56
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}
