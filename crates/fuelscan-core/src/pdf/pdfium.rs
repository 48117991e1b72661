//! Page rasterization through a dynamically bound PDFium library.

use image::{DynamicImage, RgbaImage};
use lazy_static::lazy_static;
use pdfium_render::prelude::{PdfRenderConfig, Pdfium};
use tracing::{debug, warn};

use super::{target_width, Result, MAX_RENDER_DIMENSION};
use crate::error::PdfError;

// Relative to the working directory of the running binary.
const BINDING_LOCATION: &str = "./";

lazy_static! {
    static ref PDFIUM: Option<Pdfium> = Pdfium::bind_to_library(
        Pdfium::pdfium_platform_library_name_at_path(BINDING_LOCATION)
    )
    .or_else(|_| Pdfium::bind_to_system_library())
    .map(Pdfium::new)
    .map_err(|err| warn!("PDFium not available, scanned PDFs use embedded images: {:?}", err))
    .ok();
}

/// Whether a PDFium library could be bound.
pub fn is_available() -> bool {
    PDFIUM.is_some()
}

/// Render `page` (1-based) of `data` at `zoom` pixels per point.
pub fn render(data: &[u8], page: u32, zoom: f32) -> Result<DynamicImage> {
    let pdfium = PDFIUM
        .as_ref()
        .ok_or_else(|| PdfError::Rasterize("PDFium library not bound".to_string()))?;

    let document = pdfium
        .load_pdf_from_byte_slice(data, None)
        .map_err(|e| PdfError::Rasterize(e.to_string()))?;
    let index = page.checked_sub(1).ok_or(PdfError::InvalidPage(page))? as usize;
    let pdf_page = document
        .pages()
        .iter()
        .nth(index)
        .ok_or(PdfError::InvalidPage(page))?;

    let width = target_width(pdf_page.width().value, zoom);
    let config = PdfRenderConfig::new()
        .set_target_width(width as i32)
        .set_maximum_width(MAX_RENDER_DIMENSION as i32)
        .set_maximum_height(MAX_RENDER_DIMENSION as i32);
    let bitmap = pdf_page
        .render_with_config(&config)
        .map_err(|e| PdfError::Rasterize(e.to_string()))?;

    let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
    debug!("PDFium rendered page {} at {}x{} (zoom {})", page, width, height, zoom);

    RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| PdfError::Rasterize("PDFium bitmap size mismatch".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{scanned_pdf, text_pdf};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_follows_zoom() {
        if !is_available() {
            return;
        }

        let page = render(&scanned_pdf(200, 100, 150), 1, 2.0).unwrap();
        assert_eq!(page.width(), 400);

        // Text-only pages rasterize too.
        let page = render(&text_pdf(&["AUTO POSTO ESTRELA"]), 1, 1.0).unwrap();
        assert_eq!(page.width(), 595);
    }

    #[test]
    fn test_render_rejects_missing_page() {
        if !is_available() {
            return;
        }

        let pdf = text_pdf(&["AUTO POSTO ESTRELA"]);
        assert!(matches!(render(&pdf, 0, 1.0), Err(PdfError::InvalidPage(0))));
        assert!(matches!(render(&pdf, 2, 1.0), Err(PdfError::InvalidPage(2))));
    }
}
