//! Configuration structures for the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DocumentProcessingError, Result};

/// Main configuration for the fuelscan pipeline.
///
/// Every threshold the pipeline uses lives here; the defaults are the
/// empirically tuned values and tests override them per case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Image normalization configuration.
    pub normalize: NormalizeConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Which OCR implementation backs the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackendKind {
    /// PaddleOCR models run through `pure-onnx-ocr`.
    Onnx,
    /// The `tesseract` executable.
    Tesseract,
}

/// A recognition model for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageModel {
    /// Language code; passed to tesseract as `-l <code>`.
    pub code: String,

    /// Recognition model file name (ONNX backend).
    pub recognition_model: String,

    /// Character dictionary file name (ONNX backend).
    pub dictionary: String,
}

impl LanguageModel {
    pub fn new(
        code: impl Into<String>,
        recognition_model: impl Into<String>,
        dictionary: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            recognition_model: recognition_model.into(),
            dictionary: dictionary.into(),
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Disable to run in direct-text-only mode.
    pub enabled: bool,

    /// Backend implementation.
    pub backend: OcrBackendKind,

    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,

    /// Text detection model file name (shared by all languages).
    pub detection_model: String,

    /// Language model tried first.
    pub primary: LanguageModel,

    /// Language model tried when the primary one errors.
    pub fallback: LanguageModel,

    /// Path to the tesseract executable.
    pub tesseract_path: String,

    /// Keep `[UNK]` markers emitted by the recognizer.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: OcrBackendKind::Onnx,
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            primary: LanguageModel::new("por", "latin_rec.onnx", "latin_dict.txt"),
            fallback: LanguageModel::new("eng", "en_rec.onnx", "en_dict.txt"),
            tesseract_path: "tesseract".to_string(),
            keep_unk: false,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum non-whitespace characters for a text layer to be trusted.
    pub min_text_length: usize,

    /// Zoom applied when rasterizing a page for OCR (1.0 = 72 DPI).
    pub render_zoom: f32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
            render_zoom: 2.0,
        }
    }
}

/// Image enhancement applied before OCR.
///
/// The factors are fixed empirical constants; they are only exposed so test
/// fixtures can pin or neutralize them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Images narrower than this are upscaled to it.
    pub min_width: u32,

    /// Brightness factor (1.0 = unchanged).
    pub brightness: f32,

    /// Contrast factor (1.0 = unchanged).
    pub contrast: f32,

    /// Sharpness factor (1.0 = unchanged).
    pub sharpness: f32,

    /// Apply the final sharpening convolution.
    pub final_sharpen: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            min_width: 1000,
            brightness: 1.2,
            contrast: 2.5,
            sharpness: 2.0,
            final_sharpen: true,
        }
    }
}

/// Receipt field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Lines scanned for a vendor keyword.
    pub vendor_scan_lines: usize,

    /// Lines scanned for the vendor fallback.
    pub vendor_fallback_lines: usize,

    /// Unlabeled currency values below this are taken as a price per liter.
    pub unit_price_ceiling: Decimal,

    /// Relative tolerance for quantity x unit price against the total.
    pub amount_tolerance: Decimal,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            vendor_scan_lines: 10,
            vendor_fallback_lines: 5,
            unit_price_ceiling: Decimal::from(15),
            amount_tolerance: Decimal::new(5, 2),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            DocumentProcessingError::Config(format!("{}: {}", path.display(), e))
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| DocumentProcessingError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.ocr.model_dir.join(model_name)
    }
}
