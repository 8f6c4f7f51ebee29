use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::{load_settings, normalize_server_url},
    logging::{apply_log_filter, init_logging},
    Classifier, HttpClassifier, SelectedFile,
};
use shared::{domain::CategoryPalette, protocol::ClassificationResult};

#[derive(Parser, Debug)]
#[command(name = "ecosort", about = "Classify one waste photo against an EcoSort backend")]
struct Args {
    /// Settings file (defaults to ./ecosort.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    /// Print the raw classification as JSON instead of the summary.
    #[arg(long)]
    json: bool,
    image: PathBuf,
}

fn render_summary(result: &ClassificationResult, palette: &CategoryPalette) -> String {
    let mut out = format!(
        "Category: {} ({})\n{}\n",
        result.category,
        palette.color_for(&result.category),
        result.confidence_text()
    );
    if !result.recycling_info.description.is_empty() {
        out.push_str(&format!("\n{}\n", result.recycling_info.description));
    }
    for tip in &result.recycling_info.tips {
        out.push_str(&format!("  \u{2714} {tip}\n"));
    }
    out
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_filter = init_logging();
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = normalize_server_url(&server_url)?;
    }
    if let Err(err) = apply_log_filter(&log_filter, &settings.log_filter) {
        tracing::warn!("keeping startup log filter: {err:#}");
    }

    let file = SelectedFile::from_path(&args.image)
        .with_context(|| format!("cannot open '{}'", args.image.display()))?;
    let classifier = HttpClassifier::from_settings(&settings);

    match classifier.classify(&file).await {
        Ok(result) if args.json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Ok(result) => {
            print!("{}", render_summary(&result, &CategoryPalette::default()));
            Ok(())
        }
        Err(err) => {
            tracing::debug!("classification failed: {err}");
            eprintln!("{}", err.user_message());
            Err(err).context("classification failed")
        }
    }
}
