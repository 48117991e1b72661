//! Common regex patterns for Brazilian fuel receipt extraction.
//!
//! Decimal separators are matched as either comma or dot; OCR output mixes
//! both. All label patterns are case-insensitive.

use lazy_static::lazy_static;
use regex::Regex;

/// A monetary value with two decimals, optionally with thousand dots
/// (`1.234,56`, `200,04`, `200.04`).
const AMOUNT_2DP: &str = r"(\d{1,3}(?:\.\d{3})+,\d{2}|\d+[,.]\d{2})";

/// A price with two or three decimals (`6,84`, `5,899`).
const PRICE_2_3DP: &str = r"(\d+[,.]\d{2,3})";

/// Optional currency marker between a label and its value.
const CURRENCY: &str = r"(?:r\$\s*)?";

/// Optional "nº"/"no." marker between a label and a document number.
const NUMERO_MARK: &str = r"(?:n[º°o]\.?\s*)?";

fn labeled(label: &str, value: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{label}\s*:?\s*{CURRENCY}{value}\b")).unwrap()
}

fn numbered(label: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{label}\s*{NUMERO_MARK}:?\s*(\d+)")).unwrap()
}

lazy_static! {
    // Date followed by time (first capture date, second time)
    pub static ref DATETIME_DMY_SLASH: Regex = Regex::new(
        r"\b(\d{2}/\d{2}/\d{4})\s+(\d{2}:\d{2}(?::\d{2})?)\b"
    ).unwrap();

    pub static ref DATETIME_DMY_DASH: Regex = Regex::new(
        r"\b(\d{2}-\d{2}-\d{4})\s+(\d{2}:\d{2}(?::\d{2})?)\b"
    ).unwrap();

    pub static ref DATETIME_YMD_DASH: Regex = Regex::new(
        r"\b(\d{4}-\d{2}-\d{2})\s+(\d{2}:\d{2}(?::\d{2})?)\b"
    ).unwrap();

    // Quantity, most specific first
    pub static ref QUANTITY_QTDE: Regex = Regex::new(
        r"(?i)\bqtde?\.?\s*:?\s*(\d+[,.]\d+)"
    ).unwrap();

    pub static ref QUANTITY_QUANTIDADE: Regex = Regex::new(
        r"(?i)\bquantidade\s*:?\s*(\d+[,.]\d+)"
    ).unwrap();

    pub static ref LITERS_DECIMAL: Regex = Regex::new(
        r"(?i)\b(\d+[,.]\d+)\s*(?:litros?|lts?|l)\b"
    ).unwrap();

    pub static ref LITERS_INTEGER: Regex = Regex::new(
        r"(?i)\b(\d+)\s*(?:litros?|lts?|l)\b"
    ).unwrap();

    pub static ref LITERS_LABEL: Regex = Regex::new(
        r"(?i)\blitros?\s*:?\s*(\d+(?:[,.]\d+)?)"
    ).unwrap();

    pub static ref KG_DECIMAL: Regex = Regex::new(
        r"(?i)\b(\d+[,.]\d+)\s*kg\b"
    ).unwrap();

    pub static ref KG_INTEGER: Regex = Regex::new(
        r"(?i)\b(\d+)\s*kg\b"
    ).unwrap();

    // Unit price
    pub static ref UNIT_PRICE_VL_UNIT: Regex =
        labeled(r"vl\.?\s*unit(?:[aá]rio)?\.?", PRICE_2_3DP);

    pub static ref UNIT_PRICE_PER_LITER: Regex =
        labeled(r"pre[cç]o\s*/\s*l(?:itro)?\.?", PRICE_2_3DP);

    pub static ref UNIT_PRICE_VALOR_UNIT: Regex =
        labeled(r"valor\s+unit(?:[aá]rio)?\.?", PRICE_2_3DP);

    // Total amount
    pub static ref TOTAL_VL_TOTAL: Regex =
        labeled(r"(?:vl|valor)\.?\s*total", AMOUNT_2DP);

    pub static ref TOTAL_VALOR_PAGO: Regex =
        labeled(r"valor\s+pago", AMOUNT_2DP);

    pub static ref TOTAL_VALOR_A_PAGAR: Regex =
        labeled(r"valor\s+a\s+pagar", AMOUNT_2DP);

    pub static ref TOTAL_LABEL: Regex =
        labeled(r"total", AMOUNT_2DP);

    // Any currency-looking token; second capture is the number
    pub static ref CURRENCY_TOKEN: Regex = Regex::new(
        r"(?i)(r\$\s*)?\b(\d{1,3}(?:\.\d{3})+,\d{2,3}|\d+[,.]\d{2,3})\b"
    ).unwrap();

    // Receipt number
    pub static ref RECEIPT_NUMERO: Regex = numbered(r"n[uú]mero");

    pub static ref RECEIPT_NFCE: Regex = numbered(r"nfc[\s-]?e");

    pub static ref RECEIPT_CUPOM: Regex = numbered(r"cupom(?:\s+fiscal)?");

    pub static ref RECEIPT_NOTA_FISCAL: Regex =
        numbered(r"nota\s+fiscal(?:\s+eletr[oô]nica)?");

    pub static ref RECEIPT_COO: Regex = numbered(r"coo");

    pub static ref RECEIPT_DOCUMENTO: Regex = numbered(r"doc(?:umento)?\.?");

    pub static ref RECEIPT_NF: Regex = numbered(r"nf\s*-?");

    // Vehicle plate (old AAA9999 and Mercosul AAA9A99)
    pub static ref PLATE_VEICULO_PLACA: Regex = Regex::new(
        r"(?i)\bve[ií]c(?:ulo)?\.?\s*placa\s*:?\s*([a-z]{3}[\s-]?\d[a-z0-9]\d{2})\b"
    ).unwrap();

    pub static ref PLATE_MERCOSUL: Regex = Regex::new(
        r"(?i)\bplaca\s*:?\s*([a-z]{3}[\s-]?\d[a-z]\d{2})\b"
    ).unwrap();

    pub static ref PLATE_OLD: Regex = Regex::new(
        r"(?i)\bplaca\s*:?\s*([a-z]{3}[\s-]?\d{4})\b"
    ).unwrap();

    pub static ref PLATE_SHAPE: Regex = Regex::new(
        r"^[A-Z]{3}\d[A-Z0-9]\d{2}$"
    ).unwrap();

    // Odometer
    pub static ref ODOMETER_KM: Regex = Regex::new(
        r"(?i)\bkm\s*:?\s*(\d{3,7})\b"
    ).unwrap();

    pub static ref ODOMETER_ODOMETRO: Regex = Regex::new(
        r"(?i)\bod[oô]metro\s*:?\s*(\d{3,7})\b"
    ).unwrap();

    pub static ref ODOMETER_QUILOMETRAGEM: Regex = Regex::new(
        r"(?i)\bquilometragem\s*:?\s*(\d{3,7})\b"
    ).unwrap();
}
