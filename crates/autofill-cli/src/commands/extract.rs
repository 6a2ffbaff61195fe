//! Extract command - pull identity fields out of a PDF.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use autofill_core::{AutofillConfig, DocumentPipeline, ExtractionOutput, ExtractionResponse};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF
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

    /// Skip OCR and use only the PDF text layer
    #[arg(long)]
    text_only: bool,

    /// Disable the question-answering fallback for name and address
    #[arg(long)]
    no_qa: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON extraction response
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, &args);

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Extracting fields...");

    let output = extract(args.input.clone(), config).await;
    pb.finish_and_clear();
    let output = output?;

    let rendered = format_output(&output, args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &rendered)?;
        println!("{} Output written to {}", style("✓").green(), output_path.display());
    } else {
        println!("{}", rendered);
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

/// Run the document pipeline off the async runtime.
pub async fn extract(input: PathBuf, config: AutofillConfig) -> anyhow::Result<ExtractionOutput> {
    let output = tokio::task::spawn_blocking(move || {
        DocumentPipeline::from_config(&config).extract_file(&input)
    })
    .await??;
    Ok(output)
}

fn apply_overrides(config: &mut AutofillConfig, args: &ExtractArgs) {
    if let Some(dir) = &args.model_dir {
        config.models.model_dir = dir.clone();
    }
    if args.text_only {
        config.ocr.enabled = false;
    }
    if args.no_qa {
        config.extraction.use_qa_fallback = false;
    }
}

fn format_output(output: &ExtractionOutput, format: OutputFormat) -> anyhow::Result<String> {
    let response = output.response();
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&response)?),
        OutputFormat::Text => Ok(format_text(&response)),
    }
}

fn format_text(response: &ExtractionResponse) -> String {
    let mut lines = vec![response.message.clone()];
    lines.push(format!("Text length: {} characters", response.text_length));
    lines.push(String::new());

    if response.extracted_data.is_empty() {
        lines.push("No fields found.".to_string());
    }
    for (kind, value) in response.extracted_data.iter() {
        lines.push(format!("{:<8} {}", format!("{}:", kind), value));
    }
    lines.join("\n")
}
