//! End-to-end receipt extraction.

mod acquisition;

pub use acquisition::{AcquiredText, TextAcquisition};

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::models::config::ScanConfig;
use crate::models::receipt::ExtractionResult;
use crate::ocr::{OcrAdapter, OcrEngine};
use crate::receipt::{CrossValidator, ReceiptParser};

/// What the pipeline can do on this machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Resolved OCR backend, if any.
    pub ocr_engine: Option<String>,
    /// Language models loaded by that backend, primary first.
    pub languages: Vec<String>,
}

/// Bytes in, typed receipt out.
///
/// OCR capability is resolved once at construction; `extract` takes `&self`
/// and keeps no state between calls.
#[derive(Debug)]
pub struct ReceiptPipeline {
    acquisition: TextAcquisition,
    parser: ReceiptParser,
    validator: CrossValidator,
}

impl ReceiptPipeline {
    /// Build a pipeline, loading the configured OCR backend.
    pub fn new(config: ScanConfig) -> Self {
        let ocr = OcrAdapter::from_config(&config);
        Self::with_adapter(&config, ocr)
    }

    /// Build a pipeline around a caller-supplied OCR engine.
    pub fn with_ocr_engine(config: ScanConfig, engine: Box<dyn OcrEngine>) -> Self {
        let ocr = OcrAdapter::new(Some(engine), &config.ocr);
        Self::with_adapter(&config, ocr)
    }

    fn with_adapter(config: &ScanConfig, ocr: OcrAdapter) -> Self {
        Self {
            acquisition: TextAcquisition::new(config, ocr),
            parser: ReceiptParser::new(&config.extraction),
            validator: CrossValidator::from_config(&config.extraction),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        let ocr = self.acquisition.ocr();
        Capabilities {
            ocr_engine: ocr.engine_name().map(str::to_string),
            languages: ocr.languages(),
        }
    }

    /// Extract a receipt from PDF or image bytes.
    ///
    /// Fails only when no text could be acquired; missing fields are `None`.
    pub fn extract(&self, data: &[u8]) -> Result<ExtractionResult> {
        let start = Instant::now();

        let acquired = self.acquisition.acquire(data)?;
        let mut fields = self.parser.parse(&acquired.text);
        let diagnostics = self.validator.reconcile(&mut fields);

        let completeness = fields.completeness();
        info!(
            "Extracted {}/{} key fields in {}ms",
            completeness.found,
            completeness.total,
            start.elapsed().as_millis()
        );

        Ok(ExtractionResult {
            raw_text: acquired.text,
            fields,
            source: acquired.source,
            diagnostics,
        })
    }
}

/// Extract a receipt with the default configuration.
pub fn extract(data: &[u8]) -> Result<ExtractionResult> {
    ReceiptPipeline::new(ScanConfig::default()).extract(data)
}
