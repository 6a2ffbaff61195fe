//! Fill command - launch a browser and fill a web form.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{info, warn};

use autofill_browser::ChromeBrowser;
use autofill_core::{FieldKind, FieldMap, FillResponse, FillStatus, FormFillSession};

use super::{extract, load_config};

/// Arguments for the fill command.
#[derive(Args)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["data", "data_file", "pdf"])))]
pub struct FillArgs {
    /// Form URL
    #[arg(short, long)]
    url: String,

    /// Field values as a JSON object, e.g. '{"name": "Asha Rao"}'
    #[arg(short, long)]
    data: Option<String>,

    /// File containing the JSON object of field values
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// PDF to extract field values from
    #[arg(short, long)]
    pdf: Option<PathBuf>,

    /// Run the browser without a window
    #[arg(long)]
    headless: bool,

    /// Close the browser as soon as filling finishes
    #[arg(long)]
    no_hold: bool,

    /// Stop holding the browser open after this many seconds
    #[arg(long)]
    max_hold: Option<u64>,

    /// Directory for screenshots
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

pub async fn run(args: FillArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if args.headless {
        config.browser.headless = true;
    }
    if args.no_hold || config.browser.headless {
        config.form.hold_open = false;
    }
    if let Some(secs) = args.max_hold {
        config.form.max_hold_secs = Some(secs);
    }
    if let Some(dir) = &args.output_dir {
        config.form.output_dir = dir.clone();
    }

    let fields = if let Some(data) = &args.data {
        parse_fields(data)?
    } else if let Some(path) = &args.data_file {
        parse_fields(&fs::read_to_string(path)?)?
    } else if let Some(pdf) = &args.pdf {
        let output = extract::extract(pdf.clone(), config.clone()).await?;
        output.fields
    } else {
        anyhow::bail!("One of --data, --data-file or --pdf is required");
    };

    if fields.is_empty() {
        warn!("No field values available; questions will be counted but left empty");
    } else {
        info!("Filling with fields: {}", fields.keys().join(", "));
    }

    let page = ChromeBrowser::launch(&config.browser).await?;

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(());
        }
    });

    if config.form.hold_open {
        eprintln!(
            "{} The browser stays open after filling. Close it or press Ctrl-C to finish.",
            style("ℹ").blue()
        );
    }

    let mut session = FormFillSession::new(page, config.form.clone()).with_interrupt(rx);
    let report = session.run(&args.url, &fields).await?;

    for question in &report.questions {
        let marker = match &question.status {
            FillStatus::Filled { .. } => style("✓").green(),
            FillStatus::NoValue => style("-").dim(),
            FillStatus::Failed => style("✗").red(),
        };
        eprintln!("{} [{}] {}", marker, question.index, question.label);
    }

    println!("{}", serde_json::to_string_pretty(&FillResponse::from(&report))?);
    Ok(())
}

/// Parse a JSON object of field values. Unknown keys and non-string values
/// are skipped.
fn parse_fields(data: &str) -> anyhow::Result<FieldMap> {
    let json: Value = serde_json::from_str(data).map_err(|e| anyhow::anyhow!("Invalid field data: {}", e))?;
    let object = json
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("Field data must be a JSON object"))?;

    let mut fields = FieldMap::new();
    for (key, value) in object {
        let kind = match key.parse::<FieldKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!("Ignoring {}", e);
                continue;
            }
        };
        match value {
            Value::String(s) => {
                fields.insert(kind, s.trim());
            }
            Value::Number(n) => {
                fields.insert(kind, n.to_string());
            }
            Value::Null => {}
            other => warn!("Ignoring non-text value for {}: {}", key, other),
        }
    }
    Ok(fields)
}
