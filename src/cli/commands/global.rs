use super::connect;
use crate::cli::app::ConnectionArgs;
use crate::cli::ui::with_spinner;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use merch_hub::api::CoveoClient;
use merch_hub::config::Config;
use merch_hub::global_config::{
    add_additional_field, apply_shared_settings, extract_shared_settings, fetch_config,
    remove_additional_field, save_config, ConfigKind,
};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

#[derive(Args)]
pub struct GlobalCommands {
    #[command(subcommand)]
    pub command: GlobalSubcommands,
}

#[derive(Subcommand)]
pub enum GlobalSubcommands {
    /// Print a configuration document
    Show {
        kind: ConfigKind,
        /// Write the JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace a configuration with the JSON document in FILE
    Save { kind: ConfigKind, file: PathBuf },
    /// Copy perPage, additionalFields and sorts from one configuration to another
    CopySettings {
        #[arg(long)]
        from: ConfigKind,
        #[arg(long)]
        to: ConfigKind,
        /// Print the resulting document without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Add a field to additionalFields
    AddField { kind: ConfigKind, field: String },
    /// Remove a field from additionalFields
    RemoveField { kind: ConfigKind, field: String },
}

pub async fn handle_global_command(args: GlobalCommands, connection: &ConnectionArgs) -> Result<()> {
    let config = Config::load()?;
    let client = connect(&config, connection)?;

    match args.command {
        GlobalSubcommands::Show { kind, output } => {
            let data = load(&client, kind).await?;
            let pretty = serde_json::to_string_pretty(&data)?;
            match output {
                Some(path) => {
                    fs::write(&path, pretty)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("{} Saved {} configuration to {}", "✓".bright_green(), kind, path.display());
                }
                None => println!("{}", pretty),
            }
        }
        GlobalSubcommands::Save { kind, file } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {:?}", file))?;
            let data: Value = serde_json::from_str(&content)
                .with_context(|| format!("{:?} is not valid JSON", file))?;
            store(&client, kind, &data).await?;
        }
        GlobalSubcommands::CopySettings { from, to, dry_run } => {
            let source = load(&client, from).await?;
            let settings = extract_shared_settings(&source);
            let mut target = load(&client, to).await?;
            apply_shared_settings(&mut target, &settings, to);
            if settings.sorts.is_some() && !to.supports_sorts() {
                println!("{} {} has no sorts, only perPage and additionalFields were copied", "ℹ".bright_blue(), to);
            }

            if dry_run {
                println!("{}", serde_json::to_string_pretty(&target)?);
            } else {
                store(&client, to, &target).await?;
            }
        }
        GlobalSubcommands::AddField { kind, field } => {
            let mut data = load(&client, kind).await?;
            if !add_additional_field(&mut data, &field) {
                println!("{} '{}' is already listed", "ℹ".bright_blue(), field);
                return Ok(());
            }
            store(&client, kind, &data).await?;
        }
        GlobalSubcommands::RemoveField { kind, field } => {
            let mut data = load(&client, kind).await?;
            if !remove_additional_field(&mut data, &field) {
                println!("{} '{}' is not listed", "ℹ".bright_blue(), field);
                return Ok(());
            }
            store(&client, kind, &data).await?;
        }
    }

    Ok(())
}

async fn load(client: &CoveoClient, kind: ConfigKind) -> Result<Value> {
    let fetched = with_spinner(format!("Fetching {} configuration...", kind), fetch_config(client, kind))
        .await
        .with_context(|| format!("Failed to fetch {} configuration", kind))?;
    if let Some(notice) = fetched.notice {
        eprintln!("{} {}", "ℹ".bright_blue(), notice);
    }
    Ok(fetched.data)
}

async fn store(client: &CoveoClient, kind: ConfigKind, data: &Value) -> Result<()> {
    with_spinner(format!("Saving {} configuration...", kind), save_config(client, kind, data))
        .await
        .with_context(|| format!("Failed to save {} configuration", kind))?;
    println!("{} {} configuration saved", "✓".bright_green(), kind);
    Ok(())
}
