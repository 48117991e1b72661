//! Document format detection by magic bytes.

use serde::{Deserialize, Serialize};

/// The `%PDF` signature every PDF file starts with.
pub const PDF_SIGNATURE: &[u8; 4] = b"%PDF";

/// Kind of document handed to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Any raster image; the decoder decides whether it is actually valid.
    Image,
}

/// Classify a document by its first four bytes.
///
/// Anything that is not a PDF is treated as an image, including buffers too
/// short to carry a signature. A bad image then fails in the decoder with a
/// clear error instead of here.
pub fn sniff_format(data: &[u8]) -> DocumentFormat {
    if data.starts_with(PDF_SIGNATURE) {
        DocumentFormat::Pdf
    } else {
        DocumentFormat::Image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_signature() {
        assert_eq!(sniff_format(b"%PDF-1.7\n%\xe2\xe3"), DocumentFormat::Pdf);
    }

    #[test]
    fn test_png_is_image() {
        assert_eq!(sniff_format(b"\x89PNG\r\n\x1a\n"), DocumentFormat::Image);
    }

    #[test]
    fn test_short_and_empty_buffers() {
        assert_eq!(sniff_format(b""), DocumentFormat::Image);
        assert_eq!(sniff_format(b"%PD"), DocumentFormat::Image);
    }

    #[test]
    fn test_signature_must_be_at_start() {
        assert_eq!(sniff_format(b" %PDF-1.4"), DocumentFormat::Image);
    }
}
