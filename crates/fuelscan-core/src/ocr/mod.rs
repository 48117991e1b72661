//! OCR engines, image normalization and the language fallback adapter.

mod adapter;
mod normalizer;
#[cfg(feature = "onnx")]
mod onnx_engine;
mod tesseract;

pub use adapter::{OcrAdapter, OcrOutput};
#[cfg(test)]
pub(crate) use adapter::testing;
pub use normalizer::ImageNormalizer;
#[cfg(feature = "onnx")]
pub use onnx_engine::OnnxOcrEngine;
pub use tesseract::{is_tesseract_available, TesseractEngine};

use image::DynamicImage;
use tracing::{info, warn};

use crate::error::OcrError;
use crate::models::config::{LanguageModel, OcrBackendKind, ScanConfig};

/// A text recognizer for whole images.
///
/// Engines are shared by every call on a pipeline, possibly from several
/// threads at once.
pub trait OcrEngine: Send + Sync {
    /// Short backend name for logs and capability reports.
    fn name(&self) -> &'static str;

    /// Whether a model for `language` is loaded.
    fn supports(&self, language: &LanguageModel) -> bool;

    /// Recognize the text of `image` with the given language model, lines
    /// separated by `\n`.
    fn recognize(&self, image: &DynamicImage, language: &LanguageModel) -> Result<String, OcrError>;
}

/// Resolve the configured OCR backend once.
///
/// Returns `None` when OCR is disabled or no backend could be loaded; an
/// ONNX backend without models falls back to tesseract.
pub fn create_engine(config: &ScanConfig) -> Option<Box<dyn OcrEngine>> {
    let ocr = &config.ocr;
    if !ocr.enabled {
        info!("OCR disabled by configuration");
        return None;
    }

    if ocr.backend == OcrBackendKind::Onnx {
        match onnx_engine(config) {
            Ok(engine) => return Some(engine),
            Err(e) => warn!("ONNX OCR backend unavailable, trying tesseract: {}", e),
        }
    }

    match TesseractEngine::new(ocr) {
        Ok(engine) => Some(Box::new(engine)),
        Err(e) => {
            warn!("No OCR backend available: {}", e);
            None
        }
    }
}

#[cfg(feature = "onnx")]
fn onnx_engine(config: &ScanConfig) -> Result<Box<dyn OcrEngine>, OcrError> {
    Ok(Box::new(OnnxOcrEngine::from_config(config)?))
}

#[cfg(not(feature = "onnx"))]
fn onnx_engine(_config: &ScanConfig) -> Result<Box<dyn OcrEngine>, OcrError> {
    Err(OcrError::Unavailable(
        "built without the `onnx` feature".to_string(),
    ))
}
