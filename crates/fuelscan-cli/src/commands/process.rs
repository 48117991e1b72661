//! Process command - extract data from a single receipt file.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::{debug, info};

use fuelscan_core::{Diagnostic, ExtractionResult, ReceiptPipeline, TextSource};

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Skip OCR and use only the PDF text layer
    #[arg(long)]
    no_ocr: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.no_ocr {
        config.ocr.enabled = false;
    }
    if let Some(model_dir) = &args.model_dir {
        config.ocr.model_dir = model_dir.clone();
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let data = fs::read(&args.input)?;
    info!("Processing file: {} ({} bytes)", args.input.display(), data.len());

    // Model loading and extraction are both blocking work.
    let task = tokio::task::spawn_blocking(move || ReceiptPipeline::new(config).extract(&data));
    let result = match tokio::time::timeout(Duration::from_secs(args.timeout), task).await {
        Ok(joined) => joined??,
        Err(_) => anyhow::bail!("Extraction timed out after {}s", args.timeout),
    };

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    print_summary(&result);

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_summary(result: &ExtractionResult) {
    let completeness = result.completeness();
    let marker = if completeness.is_complete() {
        style("✓").green()
    } else {
        style("ℹ").blue()
    };
    eprintln!(
        "{} {}/{} key fields extracted (source: {})",
        marker,
        completeness.found,
        completeness.total,
        source_label(&result.source)
    );

    if result.needs_review() {
        eprintln!("{}", style("Needs review:").yellow());
    }
    for diagnostic in &result.diagnostics {
        eprintln!("  - {}", describe(diagnostic));
    }
}

fn describe(diagnostic: &Diagnostic) -> String {
    match diagnostic {
        Diagnostic::AmountInconsistency {
            expected,
            found,
            deviation,
        } => format!(
            "total {} differs from quantity x unit price {} ({})",
            found,
            expected,
            percent(*deviation)
        ),
        Diagnostic::DerivedTotal { total } => {
            format!("total {} computed from quantity x unit price", total)
        }
    }
}

fn percent(ratio: Decimal) -> String {
    ratio
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|p| format!("{}%", p.round_dp(2)))
        .unwrap_or_else(|| "deviation out of range".to_string())
}

fn source_label(source: &TextSource) -> String {
    match source {
        TextSource::PdfTextLayer { library } => format!("pdf text layer, {}", library),
        TextSource::Ocr {
            language,
            from_pdf: true,
        } => format!("ocr {}, rasterized pdf", language),
        TextSource::Ocr {
            language,
            from_pdf: false,
        } => format!("ocr {}", language),
    }
}

fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn iso_datetime(result: &ExtractionResult) -> String {
    result
        .fields
        .transaction_datetime
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_default()
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let fields = &result.fields;
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "vendor_name",
        "transaction_datetime",
        "quantity_liters",
        "unit_price",
        "total_amount",
        "fuel_type",
        "receipt_number",
        "vehicle_plate",
        "odometer_km",
        "source",
        "needs_review",
    ])?;

    wtr.write_record([
        opt(&fields.vendor_name),
        iso_datetime(result),
        opt(&fields.quantity_liters),
        opt(&fields.unit_price),
        opt(&fields.total_amount),
        opt(&fields.fuel_type),
        opt(&fields.receipt_number),
        opt(&fields.vehicle_plate),
        opt(&fields.odometer_km),
        source_label(&result.source),
        result.needs_review().to_string(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let fields = &result.fields;
    let show = |value: String| {
        if value.is_empty() {
            "-".to_string()
        } else {
            value
        }
    };

    let mut output = String::new();

    output.push_str(&format!("Vendor:     {}\n", show(opt(&fields.vendor_name))));
    output.push_str(&format!("Date/time:  {}\n", show(opt(&fields.transaction_datetime))));
    output.push_str(&format!("Receipt:    {}\n", show(opt(&fields.receipt_number))));
    output.push('\n');

    output.push_str(&format!("Fuel:       {}\n", show(opt(&fields.fuel_type))));
    output.push_str(&format!("Quantity:   {} L\n", show(opt(&fields.quantity_liters))));
    output.push_str(&format!("Unit price: R$ {}\n", show(opt(&fields.unit_price))));
    output.push_str(&format!("Total:      R$ {}\n", show(opt(&fields.total_amount))));
    output.push('\n');

    output.push_str(&format!("Plate:      {}\n", show(opt(&fields.vehicle_plate))));
    output.push_str(&format!("Odometer:   {} km\n", show(opt(&fields.odometer_km))));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> ExtractionResult {
        serde_json::from_value(json!({
            "raw_text": "POSTO SHELL\nQtde.:29,24\nVl. Unit.: 6,84",
            "vendor_name": "POSTO SHELL",
            "transaction_datetime": "2024-01-15T14:32:07",
            "quantity_liters": "29.24",
            "unit_price": "6.84",
            "total_amount": "200.00",
            "fuel_type": "diesel",
            "receipt_number": "123456",
            "vehicle_plate": "ABC1D23",
            "odometer_km": 508870,
            "source": { "kind": "ocr", "language": "por", "from_pdf": true },
            "diagnostics": [{ "kind": "derived_total", "total": "200.00" }]
        }))
        .unwrap()
    }

    #[test]
    fn test_format_csv() {
        let csv = format_csv(&sample()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "vendor_name,transaction_datetime,quantity_liters,unit_price,total_amount,\
             fuel_type,receipt_number,vehicle_plate,odometer_km,source,needs_review"
        );
        assert_eq!(
            lines[1],
            "POSTO SHELL,2024-01-15T14:32:07,29.24,6.84,200.00,diesel,123456,ABC1D23,508870,\
             \"ocr por, rasterized pdf\",false"
        );
    }

    #[test]
    fn test_format_text_marks_missing_fields() {
        let mut result = sample();
        result.fields.vehicle_plate = None;
        let text = format_text(&result);

        assert!(text.contains("Total:      R$ 200.00"));
        assert!(text.contains("Plate:      -"));
        assert!(text.contains("Odometer:   508870 km"));
    }

    #[test]
    fn test_format_json_is_flat() {
        let json: serde_json::Value =
            serde_json::from_str(&format_result(&sample(), OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["vehicle_plate"], "ABC1D23");
        assert_eq!(json["source"]["kind"], "ocr");
    }

    #[test]
    fn test_describe_inconsistency() {
        let diagnostic: Diagnostic = serde_json::from_value(json!({
            "kind": "amount_inconsistency",
            "expected": "50.00",
            "found": "60.00",
            "deviation": "0.2"
        }))
        .unwrap();

        assert_eq!(
            describe(&diagnostic),
            "total 60.00 differs from quantity x unit price 50.00 (20.0%)"
        );
    }

    #[test]
    fn test_describe_huge_deviation() {
        let diagnostic = Diagnostic::AmountInconsistency {
            expected: Decimal::ONE,
            found: Decimal::MAX,
            deviation: Decimal::MAX,
        };
        assert!(describe(&diagnostic).ends_with("(deviation out of range)"));
    }
}
