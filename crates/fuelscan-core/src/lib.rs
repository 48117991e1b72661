//! Core library for Brazilian fuel receipt extraction.
//!
//! This crate provides:
//! - Format sniffing (PDF vs raster image)
//! - PDF text layer extraction, with first-page rasterization for scans
//! - Image normalization and OCR with a language fallback
//! - Receipt field extraction (amounts, fuel, plate, odometer, vendor)
//! - Cross-validation of quantity, unit price and total

pub mod error;
pub mod format;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod receipt;

pub use error::{DocumentProcessingError, OcrError, PdfError, Result};
pub use format::{sniff_format, DocumentFormat};
pub use models::config::{OcrBackendKind, ScanConfig};
pub use models::receipt::{
    Completeness, Diagnostic, ExtractionResult, FuelType, ReceiptFields, TextSource,
};
pub use ocr::{create_engine, OcrAdapter, OcrEngine};
pub use pipeline::{extract, Capabilities, ReceiptPipeline};
pub use receipt::{CrossValidator, ReceiptParser};
