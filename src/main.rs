use anyhow::Result;
use clap::Parser;
use log::info;

mod cli;

use cli::Cli;
use cli::app::Commands;

#[tokio::main]
async fn main() -> Result<()> {
    // Log to file, truncated on each run
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("merch-hub.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {:?}", path);
    }

    let cli = Cli::parse();
    info!("Starting merch-hub");

    let connection = cli.connection;
    match cli.command {
        Commands::Import(args) => cli::commands::handle_import_command(args, &connection).await?,
        Commands::Export(args) => cli::commands::handle_export_command(args, &connection).await?,
        Commands::DeleteAll(args) => {
            cli::commands::handle_delete_all_command(args, &connection).await?
        }
        Commands::Global(args) => cli::commands::handle_global_command(args, &connection).await?,
        Commands::Categories(args) => {
            cli::commands::handle_categories_command(args, &connection).await?
        }
        Commands::Env(args) => cli::commands::handle_env_command(args).await?,
    }

    Ok(())
}
