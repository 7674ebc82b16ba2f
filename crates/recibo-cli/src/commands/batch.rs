//! Batch processing command for multiple receipt text files.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use recibo_core::batch::{ChatbotExport, StructuredReport};
use recibo_core::{ExtractionOutcome, Pipeline, ReciboConfig};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory for the batch artifacts
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers (default from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        ReciboConfig::from_file(std::path::Path::new(path))?
    } else {
        ReciboConfig::default()
    };

    // Expand glob pattern; inputs are OCR text dumps
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("txt")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching .txt files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    fs::create_dir_all(&args.output_dir)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    // Each document's run is independent; fan out across blocking
    // workers, keeping input order in the collected results.
    let jobs = args.jobs.unwrap_or(config.batch.jobs).max(1);
    let pipeline = Arc::new(Pipeline::from_config(&config));

    let outcomes: Vec<Option<ExtractionOutcome>> = stream::iter(files.iter().cloned())
        .map(|path| {
            let pipeline = Arc::clone(&pipeline);
            let pb = pb.clone();
            tokio::task::spawn_blocking(move || {
                let file_name = path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("unknown")
                    .to_string();

                let outcome = match fs::read_to_string(&path) {
                    Ok(text) => Some(pipeline.run(&text, Some(&file_name))),
                    Err(e) => {
                        warn!("Failed to read {}: {}", path.display(), e);
                        None
                    }
                };
                pb.inc(1);
                outcome
            })
        })
        .buffered(jobs)
        .map(|joined| match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Worker task failed: {}", e);
                None
            }
        })
        .collect()
        .await;

    pb.finish_with_message("Complete");

    let unreadable = outcomes.iter().filter(|o| o.is_none()).count();
    let outcomes: Vec<ExtractionOutcome> = outcomes.into_iter().flatten().collect();

    // Single-threaded reduction over the complete set of outcomes.
    let report = StructuredReport::from_outcomes(&outcomes);
    let export = ChatbotExport::from_outcomes(&outcomes);

    let report_path = args.output_dir.join(&config.batch.structured_file);
    fs::write(&report_path, serde_json::to_string_pretty(&report)?)?;

    let export_path = args.output_dir.join(&config.batch.chatbot_file);
    fs::write(&export_path, serde_json::to_string_pretty(&export)?)?;

    if args.summary {
        let summary_path = args.output_dir.join("summary.csv");
        write_summary(&summary_path, &outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed = outcomes.iter().filter(|o| o.receipt.is_error()).count();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(outcomes.len() - failed).green(),
        style(failed).red()
    );
    if unreadable > 0 {
        println!("   {} unreadable, skipped", style(unreadable).yellow());
    }

    if failed > 0 {
        println!();
        println!("{}", style("Failed documents:").red());
        for outcome in outcomes.iter().filter(|o| o.receipt.is_error()) {
            println!(
                "  - {}: {}",
                outcome.receipt.source.file,
                outcome.receipt.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    println!();
    println!("{} Artifacts:", style("ℹ").blue());
    println!("  - {}", report_path.display());
    println!("  - {}", export_path.display());

    Ok(())
}

fn write_summary(path: &PathBuf, outcomes: &[ExtractionOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "layout",
        "type",
        "amount",
        "payee",
        "confidence",
        "processing_time_ms",
        "error",
    ])?;

    for outcome in outcomes {
        let receipt = &outcome.receipt;
        if receipt.is_error() {
            wtr.write_record([
                receipt.source.file.as_str(),
                "error",
                "",
                "",
                "",
                "",
                "",
                &outcome.processing_time_ms.to_string(),
                receipt.error.as_deref().unwrap_or(""),
            ])?;
        } else {
            wtr.write_record([
                receipt.source.file.as_str(),
                "success",
                receipt.layout.code(),
                receipt.kind.as_str(),
                &receipt.amount.value().to_string(),
                receipt.payee.name.as_str(),
                &format!("{:.2}", receipt.confidence),
                &outcome.processing_time_ms.to_string(),
                "",
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
