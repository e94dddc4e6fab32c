use super::commands::{
    CategoriesCommands, DeleteAllCommands, EnvCommands, ExportCommands, GlobalCommands,
    ImportCommands,
};
use clap::{Args, Parser, Subcommand};
use merch_hub::config::ConnectionOverrides;

#[derive(Parser)]
#[command(name = "merch-hub")]
#[command(about = "Bulk listing-page and configuration management for Coveo Merchandising Hub")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection overrides accepted by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Stored environment to use instead of the current one
    #[arg(long, global = true)]
    pub env: Option<String>,

    /// Organization id
    #[arg(long, global = true)]
    pub org: Option<String>,

    /// Tracking id of the storefront
    #[arg(long, global = true)]
    pub tracking_id: Option<String>,

    /// Platform URL, e.g. https://platform-eu.cloud.coveo.com
    #[arg(long, global = true)]
    pub platform_url: Option<String>,

    /// Bearer access token (defaults to COVEO_ACCESS_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,
}

impl ConnectionArgs {
    pub fn overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            environment: self.env.clone(),
            organization_id: self.org.clone(),
            tracking_id: self.tracking_id.clone(),
            platform_url: self.platform_url.clone(),
            access_token: self.token.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import listing pages from a CSV file (create or update by name)
    Import(ImportCommands),
    /// Export all listing pages to a CSV file
    Export(ExportCommands),
    /// Delete every listing page of the tracking id
    DeleteAll(DeleteAllCommands),
    /// Inspect and edit global configurations
    Global(GlobalCommands),
    /// Generate listing pages from catalog category values
    Categories(CategoriesCommands),
    /// Manage stored environments
    Env(EnvCommands),
}
