//! Schema management for the ShipDesk database.
//!
//! ```text
//! migration up            # apply pending migrations
//! migration down --steps 1
//! migration status
//! migration fresh         # drop everything and re-apply
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use shipdesk_api::{
    config,
    db::{establish_connection_with_config, DbConfig},
    migrator::Migrator,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "migration", about = "Manage the ShipDesk database schema")]
struct Cli {
    /// Database URL; defaults to the configured `database_url`
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending migrations
    Up {
        #[arg(long, help = "Number of migrations to apply (all when omitted)")]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        #[arg(long, default_value_t = 1, help = "Number of migrations to roll back")]
        steps: u32,
    },
    /// Show applied and pending migrations
    Status,
    /// Drop all tables and re-apply every migration
    Fresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let database_url = match cli.database_url {
        Some(url) => {
            config::init_tracing("info", false);
            url
        }
        None => {
            let cfg = config::load_config().context("failed to load configuration")?;
            config::init_tracing(cfg.log_level(), cfg.log_json);
            cfg.database_url
        }
    };

    let db = establish_connection_with_config(&DbConfig {
        url: database_url,
        max_connections: 2,
        min_connections: 1,
        ..DbConfig::default()
    })
    .await
    .context("failed to connect to database")?;

    match cli.command {
        Command::Up { steps } => {
            Migrator::up(&db, steps).await?;
            info!("Migrations applied");
        }
        Command::Down { steps } => {
            Migrator::down(&db, Some(steps)).await?;
            info!(steps, "Migrations rolled back");
        }
        Command::Status => {
            Migrator::status(&db).await?;
        }
        Command::Fresh => {
            Migrator::fresh(&db).await?;
            info!("Database recreated");
        }
    }

    Ok(())
}
