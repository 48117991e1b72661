//! Vendor (gas station) name extraction from the receipt header.

use tracing::trace;

use super::FieldExtractor;
use crate::models::config::ExtractionConfig;

/// Fuel brands and business keywords that usually appear in the header line
/// carrying the station's name.
const VENDOR_KEYWORDS: &[&str] = &[
    "posto",
    "combustivel",
    "combustível",
    "combustiveis",
    "combustíveis",
    "gasolina",
    "diesel",
    "auto",
    "mercado",
    "servicos",
    "serviços",
    "eireli",
    "ltda",
    "me",
    "sa",
    "ipiranga",
    "shell",
    "petrobras",
    "br",
    "alesat",
    "raizen",
    "raízen",
    "ultragaz",
    "gas",
    "energy",
    "rodoporto",
    "oasis",
];

/// Keywords this short only count as whole words ("me" would otherwise
/// match "mercado", "br" would match "brasil").
const WHOLE_WORD_MAX_LEN: usize = 3;

/// Cleaned names must be longer than this.
const MIN_NAME_LEN: usize = 5;

/// Picks the station name out of the first lines of the receipt.
#[derive(Debug, Clone)]
pub struct VendorExtractor {
    scan_lines: usize,
    fallback_lines: usize,
}

impl VendorExtractor {
    pub fn new(scan_lines: usize, fallback_lines: usize) -> Self {
        Self {
            scan_lines,
            fallback_lines,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.vendor_scan_lines, config.vendor_fallback_lines)
    }

    fn keyword_line(&self, text: &str) -> Option<String> {
        text.lines()
            .take(self.scan_lines)
            .map(str::trim)
            .filter(|line| line.chars().count() > MIN_NAME_LEN)
            .filter(|line| has_vendor_keyword(line))
            .find_map(clean_name)
    }

    fn first_meaningful_line(&self, text: &str) -> Option<String> {
        text.lines()
            .take(self.fallback_lines)
            .map(str::trim)
            .filter(|line| line.chars().count() > MIN_NAME_LEN)
            .filter(|line| line.chars().any(char::is_alphabetic))
            .find_map(clean_name)
    }
}

impl Default for VendorExtractor {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl FieldExtractor for VendorExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<String> {
        if let Some(name) = self.keyword_line(text) {
            trace!("vendor_name: keyword line {:?}", name);
            return Some(name);
        }
        let name = self.first_meaningful_line(text);
        if let Some(name) = &name {
            trace!("vendor_name: fallback line {:?}", name);
        }
        name
    }
}

fn has_vendor_keyword(line: &str) -> bool {
    let lower = line.to_lowercase();
    VENDOR_KEYWORDS.iter().any(|keyword| {
        if keyword.chars().count() <= WHOLE_WORD_MAX_LEN {
            lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == *keyword)
        } else {
            lower.contains(keyword)
        }
    })
}

/// Keep letters, digits, whitespace and hyphens; `None` if too short.
fn clean_name(line: &str) -> Option<String> {
    let cleaned: String = line
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    let cleaned = cleaned.trim();
    (cleaned.chars().count() > MIN_NAME_LEN).then(|| cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vendor(text: &str) -> Option<String> {
        VendorExtractor::default().extract(text)
    }

    #[test]
    fn test_keyword_line_preferred() {
        let text = "CUPOM FISCAL ELETRONICO\nAUTO POSTO ESTRELA LTDA.\nCNPJ: 12.345.678/0001-90";
        assert_eq!(vendor(text), Some("AUTO POSTO ESTRELA LTDA".to_string()));
    }

    #[test]
    fn test_strips_punctuation_keeps_accents_and_hyphens() {
        let text = "*** Posto São-Jorge & Cia ***";
        assert_eq!(vendor(text), Some("Posto São-Jorge  Cia".to_string()));
    }

    #[test]
    fn test_short_keyword_needs_whole_word() {
        // "br" inside "BRASIL" and "me" inside "MERCEARIA" are not keywords;
        // the fallback takes the first meaningful line instead.
        let text = "12345678\nBRASIL CENTRAL\nPOSTO BR RODOVIA";
        assert_eq!(vendor(text), Some("POSTO BR RODOVIA".to_string()));

        let text = "MERCEARIA NOVA\nCOMERCIO ABC ME";
        assert_eq!(vendor(text), Some("COMERCIO ABC ME".to_string()));
    }

    #[test]
    fn test_fallback_skips_numeric_lines() {
        let text = "0001234567\n12/03/2024\nCONVENIENCIA BOA VIAGEM";
        assert_eq!(vendor(text), Some("CONVENIENCIA BOA VIAGEM".to_string()));
    }

    #[test]
    fn test_keyword_only_within_scan_window() {
        let mut text = String::new();
        for _ in 0..10 {
            text.push_str("--\n");
        }
        text.push_str("POSTO IPIRANGA CENTRO\n");
        assert_eq!(vendor(&text), None);
    }

    #[test]
    fn test_custom_windows() {
        let text = "12\n34\nPOSTO SHELL NORTE";
        assert_eq!(VendorExtractor::new(2, 2).extract(text), None);
        assert_eq!(
            VendorExtractor::new(3, 1).extract(text),
            Some("POSTO SHELL NORTE".to_string())
        );
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(vendor(""), None);
    }
}
