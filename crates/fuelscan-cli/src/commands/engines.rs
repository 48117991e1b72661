//! Engines command - report OCR capability on this machine.

use clap::Args;
use console::style;

use fuelscan_core::ocr::is_tesseract_available;
use fuelscan_core::{OcrBackendKind, ReceiptPipeline};

use super::config::load_config;

/// Arguments for the engines command.
#[derive(Args)]
pub struct EnginesArgs {
    /// Print the capabilities as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: EnginesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let ocr = config.ocr.clone();

    // Engines load their models here, off the async runtime.
    let capabilities =
        tokio::task::spawn_blocking(move || ReceiptPipeline::new(config).capabilities()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&capabilities)?);
        return Ok(());
    }

    let configured = match ocr.backend {
        OcrBackendKind::Onnx => "onnx",
        OcrBackendKind::Tesseract => "tesseract",
    };
    println!("Configured backend: {}", configured);

    match &capabilities.ocr_engine {
        Some(engine) => println!("Active OCR engine:  {}", style(engine).green()),
        None if !ocr.enabled => println!("Active OCR engine:  {}", style("disabled").yellow()),
        None => println!(
            "Active OCR engine:  {} (only PDFs with a text layer can be read)",
            style("none").red()
        ),
    }
    println!();

    println!("Languages:");
    for language in [&ocr.primary, &ocr.fallback] {
        let loaded = capabilities.languages.contains(&language.code);
        let mark = if loaded {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  {} {}", mark, language.code);
    }
    println!();

    println!("Model directory: {}", ocr.model_dir.display());
    let tesseract = if is_tesseract_available(&ocr.tesseract_path) {
        style("found").green()
    } else {
        style("not found").yellow()
    };
    println!("Tesseract ({}): {}", ocr.tesseract_path, tesseract);

    Ok(())
}
