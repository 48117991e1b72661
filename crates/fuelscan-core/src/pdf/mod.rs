//! PDF processing module.

mod extractor;
#[cfg(feature = "pdfium")]
pub mod pdfium;

pub use extractor::PdfExtractor;

use crate::error::PdfError;
use image::DynamicImage;

/// Library name reported for text read by `pdf-extract`.
pub const PRIMARY_TEXT_LIBRARY: &str = "pdf-extract";

/// Library name reported for text read by `lopdf`.
pub const SECONDARY_TEXT_LIBRARY: &str = "lopdf";

/// Text layer read from a PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfText {
    /// All pages concatenated.
    pub text: String,
    /// Library that produced `text`.
    pub library: &'static str,
}

impl PdfText {
    /// Number of non-whitespace characters.
    pub fn meaningful_len(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// Upper bound on either side of a rendered page, in pixels.
pub const MAX_RENDER_DIMENSION: u32 = 10_000;

/// Pixel width of a page `page_width` points wide at `zoom`, within
/// `1..=MAX_RENDER_DIMENSION`.
pub fn target_width(page_width: f32, zoom: f32) -> u32 {
    let width = (page_width * zoom).ceil();
    if width.is_nan() || width < 1.0 {
        return 1;
    }
    width.min(MAX_RENDER_DIMENSION as f32) as u32
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract the text layer of every page.
    fn extract_text(&self) -> Result<PdfText>;

    /// Produce a raster image of a page, `zoom` pixels per PDF point.
    fn render_page(&self, page: u32, zoom: f32) -> Result<DynamicImage>;

    /// Extract embedded images from a page.
    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>>;
}
