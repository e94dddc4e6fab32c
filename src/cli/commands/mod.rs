pub mod categories;
pub mod delete;
pub mod env;
pub mod export;
pub mod global;
pub mod import;

pub use categories::{CategoriesCommands, handle_categories_command};
pub use delete::{DeleteAllCommands, handle_delete_all_command};
pub use env::{EnvCommands, handle_env_command};
pub use export::{ExportCommands, handle_export_command};
pub use global::{GlobalCommands, handle_global_command};
pub use import::{ImportCommands, handle_import_command};

use super::app::ConnectionArgs;
use anyhow::{Context, Result};
use log::info;
use merch_hub::api::CoveoClient;
use merch_hub::config::Config;

/// Resolve connection settings and build an API client
pub(crate) fn connect(config: &Config, connection: &ConnectionArgs) -> Result<CoveoClient> {
    let settings = config.resolve_connection(&connection.overrides())?;
    info!(
        "Connecting to {} (org {}, tracking id {})",
        settings.platform_url, settings.organization_id, settings.tracking_id
    );
    let client = CoveoClient::new(settings).context("Failed to create HTTP client")?;
    Ok(client.with_page_size(config.settings.page_size))
}
