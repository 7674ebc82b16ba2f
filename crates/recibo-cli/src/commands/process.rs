//! Process command - extract data from a single receipt text file.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use recibo_core::models::wire::ReceiptRecord;
use recibo_core::{Pipeline, Receipt, ReciboConfig};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (OCR text dump)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show extraction confidence score
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Canonical JSON record
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    // Load configuration
    let config = if let Some(path) = config_path {
        ReciboConfig::from_file(std::path::Path::new(path))?
    } else {
        ReciboConfig::default()
    };

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let text = fs::read_to_string(&args.input)?;
    let file_name = args
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");

    let pipeline = Pipeline::from_config(&config);
    let receipt = pipeline.process(&text, Some(file_name));

    if let Some(error) = &receipt.error {
        eprintln!("{} {}", style("✗").red(), error);
    }

    let output = format_receipt(&receipt, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.1}%",
            style("ℹ").blue(),
            receipt.confidence * 100.0
        );
        if !receipt.warnings.is_empty() {
            println!("{}", style("Warnings:").yellow());
            for warning in &receipt.warnings {
                println!("  - {}", warning);
            }
        }
    }

    Ok(())
}

fn format_receipt(receipt: &Receipt, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let record = ReceiptRecord::from(receipt);
            Ok(serde_json::to_string_pretty(&record)?)
        }
        OutputFormat::Text => Ok(format_receipt_text(receipt)),
    }
}

fn format_receipt_text(receipt: &Receipt) -> String {
    let mut output = String::new();

    output.push_str(&format!("Receipt: {}\n", receipt.id));
    output.push_str(&format!("Layout: {}\n", receipt.layout.display_name()));
    output.push_str(&format!("Type: {}\n", receipt.kind.as_str()));
    output.push_str(&format!(
        "Amount: {}\n",
        recibo_core::receipt::rules::format_brl(receipt.amount.value())
    ));

    let when = receipt.date_time_display();
    if !when.is_empty() {
        output.push_str(&format!("Date: {}\n", when));
    }

    output.push('\n');
    output.push_str("Payer:\n");
    output.push_str(&format!("  {}\n", receipt.payer.name));
    if !receipt.payer.document.is_empty() {
        output.push_str(&format!("  Document: {}\n", receipt.payer.document));
    }
    if !receipt.payer.institution.is_empty() {
        output.push_str(&format!("  Bank: {}\n", receipt.payer.institution));
    }

    output.push('\n');
    output.push_str("Payee:\n");
    output.push_str(&format!("  {}\n", receipt.payee.name));
    if !receipt.payee.document.is_empty() {
        output.push_str(&format!("  Document: {}\n", receipt.payee.document));
    }
    if !receipt.payee.institution.is_empty() {
        output.push_str(&format!("  Bank: {}\n", receipt.payee.institution));
    }
    if !receipt.payee.pix_key.is_empty() {
        output.push_str(&format!("  PIX key: {}\n", receipt.payee.pix_key));
    }

    if !receipt.warnings.is_empty() {
        output.push('\n');
        output.push_str("Warnings:\n");
        for warning in &receipt.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    output
}
