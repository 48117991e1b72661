//! Text acquisition: PDF text layer, or OCR on a normalized raster.

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::{DocumentProcessingError, Result};
use crate::format::{sniff_format, DocumentFormat};
use crate::models::config::{PdfConfig, ScanConfig};
use crate::models::receipt::TextSource;
use crate::ocr::{ImageNormalizer, OcrAdapter, OcrOutput};
use crate::pdf::{PdfExtractor, PdfProcessor, PdfText};

/// Page rasterized when a PDF has no usable text layer.
const FIRST_PAGE: u32 = 1;

/// Raw text plus the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredText {
    pub text: String,
    pub source: TextSource,
}

/// Picks the best text source for a document and applies fallbacks.
#[derive(Debug)]
pub struct TextAcquisition {
    pdf: PdfConfig,
    normalizer: ImageNormalizer,
    ocr: OcrAdapter,
}

impl TextAcquisition {
    pub fn new(config: &ScanConfig, ocr: OcrAdapter) -> Self {
        Self {
            pdf: config.pdf.clone(),
            normalizer: ImageNormalizer::new(config.normalize.clone()),
            ocr,
        }
    }

    pub fn ocr(&self) -> &OcrAdapter {
        &self.ocr
    }

    /// Produce plain text for `data`, whatever its format.
    pub fn acquire(&self, data: &[u8]) -> Result<AcquiredText> {
        match sniff_format(data) {
            DocumentFormat::Pdf => self.acquire_pdf(data),
            DocumentFormat::Image => self.acquire_image(data),
        }
    }

    fn acquire_pdf(&self, data: &[u8]) -> Result<AcquiredText> {
        let extractor = PdfExtractor::from_bytes(data)?;

        let layer = match extractor.extract_text() {
            Ok(layer) => Some(layer),
            Err(e) => {
                warn!("No PDF library could read the text layer: {}", e);
                None
            }
        };
        let meaningful = layer.as_ref().map_or(0, PdfText::meaningful_len);
        debug!(
            "PDF text layer: {} characters (threshold {})",
            meaningful, self.pdf.min_text_length
        );

        if let Some(layer) = layer.as_ref().filter(|_| meaningful >= self.pdf.min_text_length) {
            info!("Using PDF text layer ({})", layer.library);
            return Ok(text_layer(layer.clone()));
        }

        if !self.ocr.is_available() {
            return match layer.filter(|_| meaningful > 0) {
                Some(layer) => {
                    warn!(
                        "Short PDF text layer ({} characters) and OCR unavailable; using it as is",
                        meaningful
                    );
                    Ok(text_layer(layer))
                }
                None => Err(DocumentProcessingError::OcrUnavailable),
            };
        }

        info!(
            "PDF text layer too short ({} < {}), rasterizing page {} for OCR",
            meaningful, self.pdf.min_text_length, FIRST_PAGE
        );
        let page = extractor.render_page(FIRST_PAGE, self.pdf.render_zoom)?;
        let output = self.recognize(&page)?;

        Ok(AcquiredText {
            text: output.text,
            source: TextSource::Ocr {
                language: output.language,
                from_pdf: true,
            },
        })
    }

    fn acquire_image(&self, data: &[u8]) -> Result<AcquiredText> {
        let image = image::load_from_memory(data)?;
        debug!("Decoded image: {}x{}", image.width(), image.height());

        if !self.ocr.is_available() {
            return Err(DocumentProcessingError::OcrUnavailable);
        }

        let output = self.recognize(&image)?;
        Ok(AcquiredText {
            text: output.text,
            source: TextSource::Ocr {
                language: output.language,
                from_pdf: false,
            },
        })
    }

    fn recognize(&self, image: &DynamicImage) -> Result<OcrOutput> {
        let normalized = self.normalizer.normalize(image);
        Ok(self.ocr.recognize(&normalized)?)
    }
}

fn text_layer(layer: PdfText) -> AcquiredText {
    AcquiredText {
        text: layer.text,
        source: TextSource::PdfTextLayer {
            library: layer.library.to_string(),
        },
    }
}
