//! Swimrankings scraper CLI application.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use shared::{Config, Database, SwimmerStore};
use std::path::PathBuf;
use swim_scraper::{PageFetcher, RosterSync, SwimrankingsScraper, UrlBook};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sync the club roster into the database
    Sync {
        /// Club to sync (defaults to the configured club)
        #[arg(long)]
        club_id: Option<u32>,

        /// Also sync every swimmer's personal bests
        #[arg(long)]
        with_bests: bool,
    },

    /// Look up a swimmer by "Last, First" name
    Athlete {
        name: String,

        /// Store the swimmer in the database
        #[arg(long)]
        save: bool,
    },

    /// Fetch a swimmer's personal bests
    Bests {
        external_id: u32,

        /// Store the results (the swimmer must already be stored)
        #[arg(long)]
        save: bool,
    },

    /// Read a swimmer's gender from their detail page
    Gender { external_id: u32 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let mut log_config = shared::LogConfig::from_config(&config, "swim-scraper");
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!(config_file = %args.config.display(), "Swim scraper starting");

    let fetcher =
        PageFetcher::from_config(&config.scraper).context("Failed to create page fetcher")?;
    let urls = UrlBook::new(&config.scraper.base_url, config.scraper.roster.clone())
        .with_context(|| format!("Invalid base URL: {}", config.scraper.base_url))?;
    let scraper = SwimrankingsScraper::new(fetcher, urls);

    match args.command {
        Command::Sync {
            club_id,
            with_bests,
        } => {
            let club_id = club_id.unwrap_or(config.scraper.roster.club_id);
            let store = open_store(&config)?;

            let mut sync = RosterSync::new(scraper, store);
            let stats = sync.run(club_id, with_bests).await.context("Sync failed")?;

            info!("=== Sync Complete ===");
            info!("Athletes scraped: {}", stats.athletes_scraped);
            info!(
                "Roster: {} inserted, {} updated, {} deleted",
                stats.roster.inserted, stats.roster.updated, stats.roster.deleted
            );
            if with_bests {
                info!("Personal bests scraped: {}", stats.bests_scraped);
                info!(
                    "Personal bests: {} inserted, {} updated",
                    stats.bests.inserted, stats.bests.updated
                );
            }
            info!("Errors: {}", stats.errors);
            info!("Swimmers stored: {}", sync.store().roster_count()?);
        }

        Command::Athlete { name, save } => {
            let athlete = scraper.fetch_athlete(&name).await?;
            print_json(&athlete)?;

            if save {
                let mut store = open_store(&config)?;
                let existing = store.load_roster()?;
                let plan = shared::plan_upsert(&existing, std::slice::from_ref(&athlete));
                let applied = store.apply_roster_plan(&plan)?;
                info!(
                    external_id = athlete.external_id,
                    inserted = applied.inserted,
                    updated = applied.updated,
                    "Saved swimmer"
                );
            }
        }

        Command::Bests { external_id, save } => {
            let bests = scraper.fetch_personal_bests(external_id).await?;
            print_json(&bests)?;

            if save {
                let mut store = open_store(&config)?;
                let existing = store.load_personal_bests(external_id)?;
                let plan = shared::plan_upsert(&existing, &bests);
                let applied = store.apply_personal_best_plan(external_id, &plan)?;
                info!(
                    external_id = external_id,
                    inserted = applied.inserted,
                    updated = applied.updated,
                    "Saved personal bests"
                );
            }
        }

        Command::Gender { external_id } => {
            let gender = scraper.fetch_athlete_gender(external_id).await?;
            println!("{}", gender);
        }
    }

    info!("Swim scraper finished successfully");

    Ok(())
}

fn open_store(config: &Config) -> Result<SwimmerStore> {
    let db_path = config.database_path();
    info!(db_path = %db_path.display(), "Opening database");
    let database = Database::open(&db_path).context("Failed to open database")?;
    Ok(SwimmerStore::new(database))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
