use super::connect;
use crate::cli::app::ConnectionArgs;
use crate::cli::ui::with_spinner;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use log::info;
use merch_hub::config::Config;
use merch_hub::listings::{export_listings, write_csv_rows};
use std::fs::File;
use std::path::PathBuf;

#[derive(Args)]
pub struct ExportCommands {
    /// Output file (defaults to listings-export-<timestamp>.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Timestamped default export file name
pub fn default_export_path() -> PathBuf {
    PathBuf::from(
        chrono::Local::now()
            .format("listings-export-%Y%m%d-%H%M%S.csv")
            .to_string(),
    )
}

pub async fn handle_export_command(args: ExportCommands, connection: &ConnectionArgs) -> Result<()> {
    let config = Config::load()?;
    let client = connect(&config, connection)?;

    let rows = with_spinner("Fetching listings...", export_listings(&client))
        .await
        .context("Failed to export listings")?;

    let path = args.output.unwrap_or_else(default_export_path);
    let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
    write_csv_rows(file, &rows).with_context(|| format!("Failed to write {:?}", path))?;
    info!("Wrote {} rows to {:?}", rows.len(), path);

    println!(
        "{} Exported {} row(s) to {}",
        "✓".bright_green(),
        rows.len(),
        path.display().to_string().cyan()
    );
    Ok(())
}
