//! Fuel receipt data models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields extracted from the text of a fuel receipt.
///
/// Every field is best-effort; `None` means no matcher produced a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptFields {
    /// Gas station / company name.
    pub vendor_name: Option<String>,

    /// Date and time printed on the receipt.
    pub transaction_datetime: Option<NaiveDateTime>,

    /// Volume dispensed (liters, or kg for compressed gas).
    pub quantity_liters: Option<Decimal>,

    /// Price per liter.
    pub unit_price: Option<Decimal>,

    /// Amount paid.
    pub total_amount: Option<Decimal>,

    /// Fuel category.
    pub fuel_type: Option<FuelType>,

    /// Receipt / NFC-e / COO number.
    pub receipt_number: Option<String>,

    /// Normalized vehicle plate (`ABC1D23` or `ABC1234`).
    pub vehicle_plate: Option<String>,

    /// Odometer reading in km.
    pub odometer_km: Option<u32>,
}

impl ReceiptFields {
    /// Count of the key fields reviewers care about most: quantity, unit
    /// price, total and date/time.
    pub fn completeness(&self) -> Completeness {
        let found = [
            self.quantity_liters.is_some(),
            self.unit_price.is_some(),
            self.total_amount.is_some(),
            self.transaction_datetime.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count();

        Completeness {
            found,
            total: Completeness::KEY_FIELDS,
        }
    }
}

/// How many of the key fields were populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completeness {
    pub found: usize,
    pub total: usize,
}

impl Completeness {
    pub const KEY_FIELDS: usize = 4;

    pub fn is_complete(&self) -> bool {
        self.found == self.total
    }

    pub fn is_empty(&self) -> bool {
        self.found == 0
    }
}

/// Fuel categories sold at Brazilian stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Diesel,
    Gasoline,
    Ethanol,
    /// GNV (gás natural veicular).
    CompressedGas,
    /// ARLA 32 exhaust fluid.
    UreaAdditive,
}

impl FuelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Diesel => "diesel",
            FuelType::Gasoline => "gasoline",
            FuelType::Ethanol => "ethanol",
            FuelType::CompressedGas => "compressed_gas",
            FuelType::UreaAdditive => "urea_additive",
        }
    }
}

impl Default for FuelType {
    /// Fleets run mostly on diesel.
    fn default() -> Self {
        Self::Diesel
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the raw text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextSource {
    /// Embedded PDF text, read by the named library.
    PdfTextLayer { library: String },
    /// OCR output for the given language model.
    Ocr { language: String, from_pdf: bool },
}

/// Non-fatal signals attached to a result for human review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Quantity x unit price disagrees with the printed total.
    AmountInconsistency {
        expected: Decimal,
        found: Decimal,
        /// Relative deviation, `|found - expected| / expected`.
        deviation: Decimal,
    },
    /// Total was not printed and was computed from quantity and unit price.
    DerivedTotal { total: Decimal },
}

impl Diagnostic {
    /// Stable identifier for log sinks and review queues.
    pub fn key(&self) -> &'static str {
        match self {
            Diagnostic::AmountInconsistency { .. } => "amount_inconsistency",
            Diagnostic::DerivedTotal { .. } => "derived_total",
        }
    }

    /// Whether the record should be flagged for manual review.
    pub fn needs_review(&self) -> bool {
        matches!(self, Diagnostic::AmountInconsistency { .. })
    }
}

/// Result of one extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Text the fields were extracted from. Empty when OCR found nothing.
    pub raw_text: String,

    /// Extracted fields.
    #[serde(flatten)]
    pub fields: ReceiptFields,

    /// Strategy that produced `raw_text`.
    pub source: TextSource,

    /// Review signals.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl ExtractionResult {
    pub fn completeness(&self) -> Completeness {
        self.fields.completeness()
    }

    /// True if any diagnostic asks for manual review.
    pub fn needs_review(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::needs_review)
    }
}
