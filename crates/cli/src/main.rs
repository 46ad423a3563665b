//! Bartender CLI - database migrations, menu seeding, and quick queries.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! bartender-cli migrate
//!
//! # Show applied migrations
//! bartender-cli status
//!
//! # Load a menu, replacing the current one and uploading drink images
//! bartender-cli seed --file menu.json --clear --images-dir ./images
//!
//! # Inspect data
//! bartender-cli sections
//! bartender-cli drinks --section Classics --include-inactive
//! bartender-cli orders --status pending --limit 20
//! ```
//!
//! Every command reads `DATABASE_URL` from the environment (or `.env`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod menu;
mod table;

#[derive(Parser)]
#[command(name = "bartender-cli")]
#[command(author, version, about = "Bartender operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// List applied migrations
    Status,
    /// Load sections and drinks from a menu file
    Seed {
        /// Path to the menu JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Delete existing drinks and sections first. Orders for those
        /// drinks are deleted with them, so this refuses while orders exist
        /// unless --force is given
        #[arg(long)]
        clear: bool,

        /// Let --clear delete existing orders
        #[arg(long, requires = "clear")]
        force: bool,

        /// Upload each drink's `image` file from this directory to the
        /// IMAGES_BUCKET bucket after seeding
        #[arg(long)]
        images_dir: Option<PathBuf>,
    },
    /// List menu sections
    Sections,
    /// List drinks
    Drinks {
        /// Only drinks in the section with this name
        #[arg(short, long)]
        section: Option<String>,

        /// Include drinks hidden from guests
        #[arg(long)]
        include_inactive: bool,
    },
    /// List recent orders
    Orders {
        /// Only orders with this status
        #[arg(short, long)]
        status: Option<String>,

        /// Maximum number of orders
        #[arg(short, long, default_value_t = 50)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bartender_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let pool = commands::connect().await?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await?,
        Commands::Status => commands::migrate::status(&pool).await?,
        Commands::Seed {
            file,
            clear,
            force,
            images_dir,
        } => {
            let options = commands::seed::SeedOptions {
                clear,
                force,
                images_dir,
            };
            commands::seed::run(&pool, &file, options).await?
        }
        Commands::Sections => commands::query::sections(&pool).await?,
        Commands::Drinks {
            section,
            include_inactive,
        } => commands::query::drinks(&pool, section.as_deref(), include_inactive).await?,
        Commands::Orders { status, limit } => {
            commands::query::orders(&pool, status.as_deref(), limit).await?
        }
    }
    Ok(())
}
