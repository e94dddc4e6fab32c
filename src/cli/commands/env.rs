use crate::cli::ui::{prompt_confirmation, prompt_environment_selection};
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use merch_hub::config::{Config, Environment, Region};

#[derive(Args)]
pub struct EnvCommands {
    #[command(subcommand)]
    pub command: EnvSubcommands,
}

#[derive(Subcommand)]
pub enum EnvSubcommands {
    /// Store an organization profile
    Add {
        /// Profile name
        #[arg(long)]
        name: String,
        /// Organization id
        #[arg(long)]
        org: String,
        /// Tracking id of the storefront
        #[arg(long)]
        tracking_id: String,
        /// Platform region
        #[arg(long, default_value = "us", conflicts_with = "platform_url")]
        region: Region,
        /// Custom platform URL
        #[arg(long)]
        platform_url: Option<String>,
        /// Make this the current environment
        #[arg(long)]
        set_current: bool,
    },
    /// List stored environments
    List,
    /// Choose the current environment
    Select {
        /// Profile name (prompted when omitted)
        name: Option<String>,
    },
    /// Remove a stored environment
    Remove {
        name: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_env_command(args: EnvCommands) -> Result<()> {
    let mut config = Config::load()?;

    match args.command {
        EnvSubcommands::Add {
            name,
            org,
            tracking_id,
            region,
            platform_url,
            set_current,
        } => {
            let environment = Environment {
                organization_id: org,
                tracking_id,
                platform_url: platform_url.unwrap_or_else(|| region.platform_url().to_string()),
            };
            config.add_environment(name.clone(), environment);
            if set_current {
                config.set_current_environment(name.clone())?;
            }
            config.save()?;
            println!("{} Environment '{}' saved", "✓".bright_green(), name);
        }
        EnvSubcommands::List => {
            let names = config.list_environments();
            if names.is_empty() {
                println!("No environments configured. Add one with `merch-hub env add`.");
                return Ok(());
            }

            let current = config.current_environment.as_deref();
            for name in names {
                let env = &config.environments[name];
                let marker = if current == Some(name.as_str()) {
                    "*".bright_green().to_string()
                } else {
                    " ".to_string()
                };
                println!(
                    "{} {}  {} / {}  {}",
                    marker,
                    name.bold(),
                    env.organization_id,
                    env.tracking_id,
                    env.platform_url.dimmed()
                );
            }
        }
        EnvSubcommands::Select { name } => {
            let name = match name {
                Some(name) => name,
                None => {
                    let names = config.list_environments();
                    if names.is_empty() {
                        anyhow::bail!("No environments configured");
                    }
                    prompt_environment_selection(&names, config.current_environment.as_deref())?
                }
            };
            config.set_current_environment(name.clone())?;
            config.save()?;
            println!("{} Switched to '{}'", "✓".bright_green(), name);
        }
        EnvSubcommands::Remove { name, force } => {
            if !config.environments.contains_key(&name) {
                anyhow::bail!("Environment '{}' not found", name);
            }
            if !force && !prompt_confirmation(&format!("Remove environment '{}'?", name), false)? {
                println!("{} Cancelled", "ℹ".bright_blue());
                return Ok(());
            }
            config.remove_environment(&name)?;
            config.save()?;
            println!("{} Environment '{}' removed", "✓".bright_green(), name);
        }
    }

    Ok(())
}
