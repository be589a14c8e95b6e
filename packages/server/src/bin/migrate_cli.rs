//! CLI for executing data migrations
//!
//! Runs registered data migrations against the configured document store
//! and prints JSON reports for scripting.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use notion_client::NotionClient;
use serde::Serialize;
use server_core::config::Config;
use server_core::data_migrations::{all_migrations, find_migration, MigrationContext};
use server_core::domains::itinerary::{ItineraryStore, NotionItineraryStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "migrate_cli")]
#[command(about = "Data migration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all registered migrations
    List,

    /// Estimate records a migration would touch
    Estimate { name: String },

    /// Run a migration
    Run {
        name: String,
        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Serialize)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    migrations: Option<Vec<MigrationInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<server_core::data_migrations::MigrationReport>,
}

#[derive(Serialize)]
struct MigrationInfo {
    name: String,
    description: String,
}

fn output(resp: Response) -> Result<()> {
    println!("{}", serde_json::to_string(&resp)?);
    Ok(())
}

fn build_store() -> Result<Arc<dyn ItineraryStore>> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let client = NotionClient::new(config.notion_api_key);
    Ok(Arc::new(NotionItineraryStore::new(
        client,
        config.notion_database_id,
    )))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            let migrations = all_migrations()
                .iter()
                .map(|m| MigrationInfo {
                    name: m.name().to_string(),
                    description: m.description().to_string(),
                })
                .collect();
            output(Response {
                success: true,
                message: None,
                count: None,
                migrations: Some(migrations),
                report: None,
            })?;
        }

        Commands::Estimate { name } => {
            let migration = find_migration(&name)
                .with_context(|| format!("Unknown migration: {name}"))?;
            let store = build_store()?;
            let count = migration.estimate(&store).await?;
            output(Response {
                success: true,
                message: None,
                count: Some(count),
                migrations: None,
                report: None,
            })?;
        }

        Commands::Run { name, dry_run } => {
            let migration = find_migration(&name)
                .with_context(|| format!("Unknown migration: {name}"))?;
            let store = build_store()?;
            let ctx = MigrationContext { store, dry_run };
            let report = migration.run(&ctx).await?;
            output(Response {
                success: true,
                message: Some(if dry_run {
                    format!("{name} dry run complete")
                } else {
                    format!("{name} complete")
                }),
                count: None,
                migrations: None,
                report: Some(report),
            })?;
        }
    }

    Ok(())
}
