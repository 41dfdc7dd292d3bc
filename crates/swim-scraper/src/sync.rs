//! Roster synchronization.
//!
//! Pulls a club roster (and optionally each swimmer's personal bests),
//! reconciles it against the store and applies the resulting plans.

use crate::api::PageSource;
use crate::scraper::SwimrankingsScraper;
use anyhow::{Context, Result};
use shared::{ApplyStats, SwimmerStore};
use tracing::{error, info};

/// Statistics for one sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub athletes_scraped: usize,
    pub roster: ApplyStats,
    pub bests_scraped: usize,
    pub bests: ApplyStats,
    pub errors: usize,
}

/// Keeps the stored roster in line with the ranking site
pub struct RosterSync<S: PageSource> {
    scraper: SwimrankingsScraper<S>,
    store: SwimmerStore,
}

impl<S: PageSource> RosterSync<S> {
    pub fn new(scraper: SwimrankingsScraper<S>, store: SwimmerStore) -> Self {
        Self { scraper, store }
    }

    /// Run one sync pass for a club.
    ///
    /// A roster that cannot be fetched aborts the run before anything is
    /// written. Personal-best failures are logged per swimmer and counted.
    pub async fn run(&mut self, club_id: u32, with_bests: bool) -> Result<SyncStats> {
        info!(club_id = club_id, with_bests = with_bests, "Starting roster sync");

        let mut stats = SyncStats::default();

        let roster = self
            .scraper
            .fetch_club_roster(club_id)
            .await
            .with_context(|| format!("Failed to fetch roster for club {}", club_id))?;
        stats.athletes_scraped = roster.len();

        let existing = self.store.load_roster()?;
        let roster_plan = shared::plan(&existing, &roster);
        stats.roster = self
            .store
            .apply_roster_plan(&roster_plan)
            .context("Failed to apply roster changes")?;

        if with_bests {
            let mut athlete_ids: Vec<u32> = roster.iter().map(|a| a.external_id).collect();
            athlete_ids.sort_unstable();
            athlete_ids.dedup();

            for (idx, athlete_id) in athlete_ids.iter().enumerate() {
                info!(
                    progress = format!("{}/{}", idx + 1, athlete_ids.len()),
                    athlete_id = athlete_id,
                    "Syncing personal bests"
                );

                match self.sync_personal_bests(*athlete_id).await {
                    Ok((scraped, applied)) => {
                        stats.bests_scraped += scraped;
                        stats.bests.inserted += applied.inserted;
                        stats.bests.updated += applied.updated;
                    }
                    Err(e) => {
                        error!(athlete_id = athlete_id, error = %e, "Failed to sync personal bests");
                        stats.errors += 1;
                    }
                }
            }
        }

        info!(
            club_id = club_id,
            athletes = stats.athletes_scraped,
            inserted = stats.roster.inserted,
            updated = stats.roster.updated,
            deleted = stats.roster.deleted,
            bests = stats.bests_scraped,
            errors = stats.errors,
            "Roster sync complete"
        );

        Ok(stats)
    }

    /// Returns the number of results scraped and what was written
    async fn sync_personal_bests(&mut self, athlete_id: u32) -> Result<(usize, ApplyStats)> {
        let bests = self.scraper.fetch_personal_bests(athlete_id).await?;
        let existing = self.store.load_personal_bests(athlete_id)?;

        let plan = shared::plan_upsert(&existing, &bests);
        let applied = self.store.apply_personal_best_plan(athlete_id, &plan)?;

        Ok((bests.len(), applied))
    }

    pub fn scraper(&self) -> &SwimrankingsScraper<S> {
        &self.scraper
    }

    pub fn store(&self) -> &SwimmerStore {
        &self.store
    }
}
