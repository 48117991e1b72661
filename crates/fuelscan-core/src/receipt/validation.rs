//! Cross-checks between quantity, unit price and total.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::models::config::ExtractionConfig;
use crate::models::receipt::{Diagnostic, ReceiptFields};

/// Reconciles `quantity x unit price` with the total.
#[derive(Debug, Clone)]
pub struct CrossValidator {
    tolerance: Decimal,
}

impl CrossValidator {
    /// `tolerance` is the accepted relative deviation (0.05 = 5 %).
    pub fn new(tolerance: Decimal) -> Self {
        Self { tolerance }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.amount_tolerance)
    }

    /// Fill a missing total from quantity and unit price, or check a printed
    /// one against them.
    ///
    /// Extracted values are never altered; a disagreement is reported as an
    /// [`Diagnostic::AmountInconsistency`].
    pub fn reconcile(&self, fields: &mut ReceiptFields) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        let (Some(quantity), Some(unit_price)) = (fields.quantity_liters, fields.unit_price) else {
            return diagnostics;
        };
        let Some(expected) = quantity.checked_mul(unit_price) else {
            warn!(
                "Quantity {} x unit price {} overflows, skipping total checks",
                quantity, unit_price
            );
            return diagnostics;
        };

        match fields.total_amount {
            None => {
                let total = expected.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                debug!("Derived total {} from {} x {}", total, quantity, unit_price);
                fields.total_amount = Some(total);
                diagnostics.push(Diagnostic::DerivedTotal { total });
            }
            Some(found) if expected > Decimal::ZERO => {
                let Some(deviation) = relative_deviation(found, expected) else {
                    warn!(
                        "Deviation of total {} from {} is not representable, skipping comparison",
                        found, expected
                    );
                    return diagnostics;
                };
                if deviation > self.tolerance {
                    let deviation = deviation.round_dp(4);
                    warn!(
                        key = "amount_inconsistency",
                        "Amount inconsistency: expected {}, found {} (deviation {})",
                        expected.round_dp(2),
                        found,
                        deviation
                    );
                    diagnostics.push(Diagnostic::AmountInconsistency {
                        expected,
                        found,
                        deviation,
                    });
                }
            }
            Some(_) => {}
        }

        diagnostics
    }
}

/// `|found - expected| / expected`, or `None` on overflow.
fn relative_deviation(found: Decimal, expected: Decimal) -> Option<Decimal> {
    found.checked_sub(expected)?.abs().checked_div(expected)
}

impl Default for CrossValidator {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn fields(q: Option<&str>, p: Option<&str>, t: Option<&str>) -> ReceiptFields {
        ReceiptFields {
            quantity_liters: q.map(dec),
            unit_price: p.map(dec),
            total_amount: t.map(dec),
            ..ReceiptFields::default()
        }
    }

    #[test]
    fn test_derives_missing_total() {
        let mut f = fields(Some("29.24"), Some("6.84"), None);
        let diagnostics = CrossValidator::default().reconcile(&mut f);

        // 29.24 x 6.84 = 200.0016
        assert_eq!(f.total_amount, Some(dec("200.00")));
        assert_eq!(
            diagnostics,
            vec![Diagnostic::DerivedTotal {
                total: dec("200.00")
            }]
        );
    }

    #[test]
    fn test_derived_total_rounds_half_away_from_zero() {
        let mut f = fields(Some("1.005"), Some("1"), None);
        CrossValidator::default().reconcile(&mut f);
        assert_eq!(f.total_amount, Some(dec("1.01")));
    }

    #[test]
    fn test_within_tolerance() {
        let mut f = fields(Some("10"), Some("5"), Some("52.00"));
        assert!(CrossValidator::default().reconcile(&mut f).is_empty());

        // Exactly 5 % is still accepted.
        let mut f = fields(Some("10"), Some("5"), Some("52.50"));
        assert!(CrossValidator::default().reconcile(&mut f).is_empty());
    }

    #[test]
    fn test_inconsistent_total_is_flagged_not_changed() {
        let mut f = fields(Some("10"), Some("5"), Some("60.00"));
        let diagnostics = CrossValidator::default().reconcile(&mut f);

        assert_eq!(f.total_amount, Some(dec("60.00")));
        assert_eq!(
            diagnostics,
            vec![Diagnostic::AmountInconsistency {
                expected: dec("50"),
                found: dec("60.00"),
                deviation: dec("0.2"),
            }]
        );
        assert_eq!(diagnostics[0].key(), "amount_inconsistency");
    }

    #[test]
    fn test_zero_expected_skips_comparison() {
        let mut f = fields(Some("0"), Some("5.49"), Some("100.00"));
        assert!(CrossValidator::default().reconcile(&mut f).is_empty());
    }

    #[test]
    fn test_missing_inputs() {
        let mut f = fields(None, Some("5.49"), None);
        assert!(CrossValidator::default().reconcile(&mut f).is_empty());
        assert_eq!(f.total_amount, None);

        let mut f = fields(Some("20"), None, Some("100.00"));
        assert!(CrossValidator::default().reconcile(&mut f).is_empty());
    }

    #[test]
    fn test_custom_tolerance() {
        let mut f = fields(Some("10"), Some("5"), Some("52.00"));
        let diagnostics = CrossValidator::new(dec("0.01")).reconcile(&mut f);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_oversized_amounts_do_not_overflow() {
        let mut f = fields(Some("99999999999999999999.50"), Some("99999999999.99"), None);
        assert!(CrossValidator::default().reconcile(&mut f).is_empty());
        assert_eq!(f.total_amount, None);

        let mut f = fields(
            Some("99999999999999999999.50"),
            Some("99999999999.99"),
            Some("100.00"),
        );
        assert!(CrossValidator::default().reconcile(&mut f).is_empty());
        assert_eq!(f.total_amount, Some(dec("100.00")));
    }

    #[test]
    fn test_unrepresentable_deviation_is_skipped() {
        // 79228162514264337593543950335 is Decimal::MAX.
        let mut f = fields(
            Some("0.0000000001"),
            Some("0.0000000001"),
            Some("79228162514264337593543950335"),
        );
        assert!(CrossValidator::default().reconcile(&mut f).is_empty());
    }
}
