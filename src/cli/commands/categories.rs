use super::connect;
use crate::cli::app::ConnectionArgs;
use crate::cli::ui::{print_listing_preview, prompt_category_selection, with_spinner};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use is_terminal::IsTerminal;
use log::{info, warn};
use merch_hub::categories::{
    fetch_field_values, generate_listings, CategoryValue, FieldValuesQuery, GeneratorTemplates,
    DEFAULT_NAME_TEMPLATE, DEFAULT_URL_TEMPLATE,
};
use merch_hub::config::Config;
use merch_hub::listings::{pages_to_rows, push_listings, write_csv_rows};
use std::fs::File;
use std::path::PathBuf;

#[derive(Args)]
pub struct CategoriesCommands {
    /// Category field to enumerate
    #[arg(long, default_value = "@ec_category")]
    pub field: String,

    /// Field holding a code for each category value
    #[arg(long)]
    pub code_field: Option<String>,

    /// Only look at products of this catalog source
    #[arg(long)]
    pub catalog_id: Option<String>,

    /// Maximum number of category values to fetch
    #[arg(long, default_value_t = 100)]
    pub max_values: u32,

    /// URL pattern template ({{value}}, {{code_value}}, optionally with "| leaf")
    #[arg(long, default_value = DEFAULT_URL_TEMPLATE)]
    pub url_template: String,

    /// Page name template
    #[arg(long, default_value = DEFAULT_NAME_TEMPLATE)]
    pub name_template: String,

    /// Use every fetched value
    #[arg(long, conflicts_with = "select")]
    pub all: bool,

    /// Use this value (repeatable)
    #[arg(long)]
    pub select: Vec<String>,

    /// Create or update the listings directly instead of writing a CSV
    #[arg(long, conflicts_with = "output")]
    pub push: bool,

    /// CSV file to write (defaults to generated-listings.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn select_categories(args: &CategoriesCommands, fetched: Vec<CategoryValue>) -> Result<Vec<CategoryValue>> {
    if args.all {
        return Ok(fetched);
    }

    if !args.select.is_empty() {
        for wanted in &args.select {
            if !fetched.iter().any(|c| &c.value == wanted) {
                warn!("Selected value '{}' was not among the fetched values", wanted);
                eprintln!("{} '{}' not found, skipped", "⚠".yellow(), wanted);
            }
        }
        return Ok(fetched
            .into_iter()
            .filter(|c| args.select.contains(&c.value))
            .collect());
    }

    if !std::io::stdin().is_terminal() {
        anyhow::bail!("Pass --all or --select when not running interactively");
    }
    prompt_category_selection(&fetched)
}

pub async fn handle_categories_command(
    args: CategoriesCommands,
    connection: &ConnectionArgs,
) -> Result<()> {
    let config = Config::load()?;
    let client = connect(&config, connection)?;

    let query = FieldValuesQuery {
        field: args.field.clone(),
        code_field: args.code_field.clone(),
        catalog_id: args.catalog_id.clone(),
        max_values: args.max_values,
    };
    let fetched = with_spinner(
        format!("Fetching values of {}...", args.field),
        fetch_field_values(&client, &query),
    )
    .await
    .with_context(|| format!("Failed to fetch values of {}", args.field))?;

    if fetched.is_empty() {
        anyhow::bail!("No values found for {}", args.field);
    }
    println!("{} Found {} value(s)", "✓".bright_green(), fetched.len());

    let selected = select_categories(&args, fetched)?;
    if selected.is_empty() {
        println!("{} Nothing selected", "ℹ".bright_blue());
        return Ok(());
    }

    let templates = GeneratorTemplates {
        field: args.field.clone(),
        url_template: args.url_template.clone(),
        name_template: args.name_template.clone(),
    };
    let listings = generate_listings(&selected, &templates, client.tracking_id());
    info!(
        "Generated {} listings from {} categories",
        listings.len(),
        selected.len()
    );
    print_listing_preview(&listings);

    if args.push {
        let summary = with_spinner(
            format!("Uploading {} listings...", listings.len()),
            push_listings(&client, listings),
        )
        .await?;
        println!("{} {}", "✓".bright_green(), summary);
        return Ok(());
    }

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from("generated-listings.csv"));
    let rows = pages_to_rows(&listings);
    let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
    write_csv_rows(file, &rows).with_context(|| format!("Failed to write {:?}", path))?;
    println!(
        "{} Wrote {} listing(s) to {}",
        "✓".bright_green(),
        listings.len(),
        path.display().to_string().cyan()
    );
    Ok(())
}
