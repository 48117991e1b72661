//! Error types for the fuelscan-core library.

use thiserror::Error;

/// Unrecoverable failure to acquire text from a document.
///
/// Field-level absences are never errors; they show up as `None` fields on
/// a successful [`ExtractionResult`](crate::ExtractionResult).
#[derive(Error, Debug)]
pub enum DocumentProcessingError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// The raster image could not be decoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// No OCR engine is available and the document has no usable text layer.
    #[error("no text layer found and OCR is not available")]
    OcrUnavailable,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to produce a raster image of a page.
    #[error("failed to rasterize page: {0}")]
    Rasterize(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// No engine (or no model for the requested language) is installed.
    #[error("OCR unavailable: {0}")]
    Unavailable(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The engine ran but reported a failure.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Scratch file handling for an external engine failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the fuelscan library.
pub type Result<T> = std::result::Result<T, DocumentProcessingError>;
