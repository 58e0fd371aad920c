use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use trivia_api::csv_io::{export_data, import_data};
use trivia_api::db::{establish_connection, run_migrations};
use trivia_api::settings::load_settings;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Database URL, overrides the configured one
    #[clap(long)]
    database_url: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Migrate,
    /// Replace categories and questions with the CSV files in a directory
    Import { path: PathBuf },
    /// Dump categories and questions as CSV files into a directory
    Export { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let settings = load_settings(None)?;
    let url = cli.database_url.unwrap_or(settings.database.url);

    let pool = establish_connection(&url, 1)
        .await
        .context("Cannot connect to DB")?;
    run_migrations(&pool).await?;
    match cli.command {
        Commands::Migrate => tracing::info!("Database is up to date"),
        Commands::Export { path } => export_data(&pool, &path).await.context("Cannot export")?,
        Commands::Import { path } => import_data(&pool, &path).await.context("Cannot import")?,
    }
    Ok(())
}
