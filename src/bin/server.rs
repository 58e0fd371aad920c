use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use trivia_api::db::{establish_connection, run_migrations};
use trivia_api::server::app::run_server;
use trivia_api::settings::load_settings;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Settings file, instead of config.toml in the working directory
    #[clap(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    let pool = establish_connection(&settings.database.url, settings.database.max_connections)
        .await
        .context("Cannot connect to DB")?;
    if settings.database.run_migrations {
        tracing::info!("Running db migrations...");
        run_migrations(&pool).await?;
    }

    run_server(pool, &settings.server).await
}
