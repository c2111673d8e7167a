//! Bulk-load the CSV data set into a fresh database.
//!
//! Reads `users.csv`, `category.csv`, `genre.csv`, `titles.csv`,
//! `genre_title.csv`, `review.csv` and `comments.csv` from one directory and
//! inserts them through the same repositories the API uses.

mod loader;
mod rows;

use std::path::PathBuf;

use anyhow::Context;
use auth::PgUserRepository;
use catalog::{CatalogConfig, PgCatalogRepository};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::loader::Seeder;
use crate::rows::DataSet;

/// `seed` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seed",
    about = "Load users, categories, genres, titles, reviews and comments from CSV files",
    version
)]
struct CliArgs {
    /// Directory holding the CSV files.
    #[arg(long = "data-dir", value_name = "path", default_value = "static/data")]
    data_dir: PathBuf,
    /// Database connection URL.
    #[arg(long = "database-url", value_name = "url", env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&args.database_url)
        .await
        .context("connect to database")?;

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    let data = DataSet::from_dir(&args.data_dir);
    let mut seeder = Seeder::new(
        PgUserRepository::new(pool.clone()),
        PgCatalogRepository::new(pool),
        CatalogConfig::default().max_year(),
    );

    for (table, report) in seeder.load(data).await {
        tracing::info!(
            table,
            loaded = report.loaded,
            skipped = report.skipped,
            "Table loaded"
        );
    }
    tracing::info!(data_dir = %args.data_dir.display(), "Seeding complete");

    Ok(())
}
