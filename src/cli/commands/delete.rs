use super::connect;
use crate::cli::app::ConnectionArgs;
use crate::cli::ui::{prompt_confirmation, with_spinner};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use is_terminal::IsTerminal;
use merch_hub::config::Config;
use merch_hub::listings::delete_all_listings;

#[derive(Args)]
pub struct DeleteAllCommands {
    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

pub async fn handle_delete_all_command(
    args: DeleteAllCommands,
    connection: &ConnectionArgs,
) -> Result<()> {
    let config = Config::load()?;
    let client = connect(&config, connection)?;

    if !args.force {
        if !std::io::stdin().is_terminal() {
            anyhow::bail!("Refusing to delete without confirmation; pass --force");
        }
        let question = format!(
            "Delete ALL listing pages of tracking id '{}'?",
            client.tracking_id()
        );
        if !prompt_confirmation(&question, false)? {
            println!("{} Cancelled", "ℹ".bright_blue());
            return Ok(());
        }
    }

    let deleted = with_spinner("Deleting listings...", delete_all_listings(&client))
        .await
        .context("Failed to delete listings")?;

    if deleted == 0 {
        println!("{} No listings to delete", "ℹ".bright_blue());
    } else {
        println!("{} Deleted {} listing(s)", "✓".bright_green(), deleted);
    }
    Ok(())
}
