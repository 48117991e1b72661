//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info, warn};

use super::OcrEngine;
use crate::error::OcrError;
use crate::models::config::{LanguageModel, ScanConfig};

/// Rows of text closer than this many pixels vertically are read as one line.
const ROW_HEIGHT: f32 = 20.0;

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
///
/// One recognizer is loaded per language model; the detection model is
/// shared by all of them. A `pure-onnx-ocr` engine caches compiled plans in
/// a `RefCell`, so each one is locked for the duration of a run.
pub struct OnnxOcrEngine {
    engines: Vec<(String, Mutex<pure_onnx_ocr::engine::OcrEngine>)>,
    keep_unk: bool,
}

impl OnnxOcrEngine {
    /// Load the primary and fallback language models from `ocr.model_dir`.
    ///
    /// Languages whose files are missing or fail to load are skipped; it is
    /// an error only if none loads.
    pub fn from_config(config: &ScanConfig) -> Result<Self, OcrError> {
        let det_path = config.model_path(&config.ocr.detection_model);

        let mut engines = Vec::new();
        for language in [&config.ocr.primary, &config.ocr.fallback] {
            let rec_path = config.model_path(&language.recognition_model);
            let dict_path = config.model_path(&language.dictionary);

            match load_engine(&det_path, &rec_path, &dict_path) {
                Ok(engine) => {
                    info!("Loaded '{}' OCR model from {}", language.code, rec_path.display());
                    engines.push((language.code.clone(), Mutex::new(engine)));
                }
                Err(e) => warn!("Skipping OCR language '{}': {}", language.code, e),
            }
        }

        if engines.is_empty() {
            return Err(OcrError::ModelLoad(format!(
                "no OCR language model could be loaded from {}",
                config.ocr.model_dir.display()
            )));
        }

        Ok(Self {
            engines,
            keep_unk: config.ocr.keep_unk,
        })
    }

    fn engine_for(
        &self,
        language: &LanguageModel,
    ) -> Option<&Mutex<pure_onnx_ocr::engine::OcrEngine>> {
        self.engines
            .iter()
            .find(|(code, _)| *code == language.code)
            .map(|(_, engine)| engine)
    }
}

fn load_engine(
    det_path: &Path,
    rec_path: &Path,
    dict_path: &Path,
) -> Result<pure_onnx_ocr::engine::OcrEngine, OcrError> {
    for path in [det_path, rec_path, dict_path] {
        if !path.is_file() {
            return Err(OcrError::ModelLoad(format!(
                "model file not found: {}",
                path.display()
            )));
        }
    }

    pure_onnx_ocr::engine::OcrEngineBuilder::new()
        .det_model_path(det_path)
        .rec_model_path(rec_path)
        .dictionary_path(dict_path)
        .build()
        .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))
}

impl OcrEngine for OnnxOcrEngine {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn supports(&self, language: &LanguageModel) -> bool {
        self.engine_for(language).is_some()
    }

    fn recognize(&self, image: &DynamicImage, language: &LanguageModel) -> Result<String, OcrError> {
        let engine = self.engine_for(language).ok_or_else(|| {
            OcrError::Unavailable(format!("no model loaded for language '{}'", language.code))
        })?;

        let engine = engine.lock().map_err(|_| {
            OcrError::Recognition(format!("'{}' engine poisoned by an earlier panic", language.code))
        })?;

        let start = Instant::now();
        let results = engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!(
            "pure-onnx-ocr returned {} text regions in {}ms",
            results.len(),
            start.elapsed().as_millis()
        );

        let boxes = results
            .iter()
            .map(|r| TextBox {
                rect: polygon_rect(&r.bounding_box),
                text: if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                },
            })
            .collect();

        Ok(join_in_reading_order(boxes))
    }
}

/// A recognized region reduced to its axis-aligned rectangle.
#[derive(Debug, Clone)]
struct TextBox {
    /// (min_x, min_y, max_x, max_y)
    rect: (f32, f32, f32, f32),
    text: String,
}

/// Sort boxes top-to-bottom, left-to-right and join them with newlines.
fn join_in_reading_order(mut boxes: Vec<TextBox>) -> String {
    boxes.sort_by(|a, b| {
        let row_a = (a.rect.1 / ROW_HEIGHT) as i32;
        let row_b = (b.rect.1 / ROW_HEIGHT) as i32;
        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            a.rect
                .0
                .partial_cmp(&b.rect.0)
                .unwrap_or(std::cmp::Ordering::Equal)
        }
    });

    boxes
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn polygon_rect(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32, f32, f32) {
    polygon.exterior().coords().fold(
        (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        |(min_x, min_y, max_x, max_y), c| {
            let (x, y) = (c.x as f32, c.y as f32);
            (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
        },
    )
}
