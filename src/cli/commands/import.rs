use super::connect;
use crate::cli::app::ConnectionArgs;
use crate::cli::ui::{print_listing_preview, with_spinner};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use log::{info, warn};
use merch_hub::api::{ListingPage, ReqwestTransport};
use merch_hub::config::Config;
use merch_hub::enhance::{apply_suggestion, GeminiEnhancer, GEMINI_API_KEY_VAR};
use merch_hub::listings::{map_rows_to_listings, parse_csv_rows, push_listings};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct ImportCommands {
    /// CSV file with Name, UrlPattern, FilterField, FilterValue, FilterOperator, Language, Country, Currency columns
    pub file: PathBuf,

    /// Show what would be sent without calling the API
    #[arg(long)]
    pub dry_run: bool,

    /// Add one AI-suggested rule to every listing (needs GEMINI_API_KEY)
    #[arg(long)]
    pub enhance: bool,
}

pub async fn handle_import_command(args: ImportCommands, connection: &ConnectionArgs) -> Result<()> {
    let config = Config::load()?;

    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read CSV file: {:?}", args.file))?;

    let rows = match parse_csv_rows(&content) {
        Ok(rows) => rows,
        Err(e) => {
            for error in &e.errors {
                eprintln!("{} {}", "✗".bright_red(), error);
            }
            return Err(e).context("CSV file was rejected, nothing was sent");
        }
    };
    info!("Parsed {} CSV rows from {:?}", rows.len(), args.file);

    let tracking_id = config.resolve_tracking_id(&connection.overrides())?;
    let mut listings = map_rows_to_listings(&rows, &tracking_id);
    if listings.is_empty() {
        anyhow::bail!(
            "No valid listings found in CSV. Each listing needs a Name and at least one complete filter (FilterField and FilterValue)."
        );
    }

    if args.enhance {
        enhance_listings(&mut listings, &config.settings.gemini_model).await?;
    }

    print_listing_preview(&listings);

    if args.dry_run {
        println!("{} Dry run, nothing was sent", "ℹ".bright_blue());
        return Ok(());
    }

    let client = connect(&config, connection)?;
    let summary = with_spinner(
        format!("Uploading {} listings...", listings.len()),
        push_listings(&client, listings),
    )
    .await?;

    println!("{} {}", "✓".bright_green(), summary);
    Ok(())
}

async fn enhance_listings(listings: &mut [ListingPage], model: &str) -> Result<()> {
    let transport = Arc::new(ReqwestTransport::new().context("Failed to create HTTP client")?);
    let enhancer = GeminiEnhancer::from_env(transport)
        .with_context(|| format!("{} is not set, cannot enhance listings", GEMINI_API_KEY_VAR))?
        .with_model(model);

    let mut added = 0;
    for listing in listings.iter_mut() {
        let suggestion = with_spinner(
            format!("Asking AI about '{}'...", listing.name),
            enhancer.suggest(&listing.name),
        )
        .await;

        match suggestion {
            Some(suggestion) if apply_suggestion(listing, &suggestion) => added += 1,
            Some(suggestion) => warn!(
                "Suggestion {}={} already present on '{}'",
                suggestion.field, suggestion.value, listing.name
            ),
            None => {}
        }
    }

    println!(
        "{} AI added {} rule(s) across {} listing(s)",
        "✓".bright_green(),
        added,
        listings.len()
    );
    Ok(())
}
