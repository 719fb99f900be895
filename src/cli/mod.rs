//! CLI module for Scholia
//!
//! Provides commands:
//! - `serve`: Start the HTTP server (default)
//! - `migrate`: Create the schema and sync the badge catalog
//! - `import-courses`: Load courses and lessons from a TOML file
//! - `notify-streaks`: Warn users whose streak lapses today (run from cron)

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::server::{load_config, open_engine};

pub mod courses;

/// Scholia CLI
#[derive(Parser, Debug)]
#[command(name = "scholia")]
#[command(about = "Progress tracking and gamification service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (default)
    Serve,
    /// Create the database schema and sync the badge catalog
    Migrate,
    /// Import courses and lessons from a TOML file
    ImportCourses {
        /// Path to the course file
        file: PathBuf,
    },
    /// Send streak-at-risk notifications (at most one per user per day)
    NotifyStreaks,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => crate::server::run().await,
        Commands::Migrate => {
            let config = load_config()?;
            open_engine(&config).await?;
            info!("Database ready at {}", config.database.path);
            Ok(())
        }
        Commands::ImportCourses { file } => {
            let config = load_config()?;
            let engine = open_engine(&config).await?;
            courses::run(engine.store(), &file).await
        }
        Commands::NotifyStreaks => {
            let config = load_config()?;
            let engine = open_engine(&config).await?;
            let sent = engine.warn_streaks_at_risk().await?;
            println!("Sent {sent} streak warning(s)");
            Ok(())
        }
    }
}
