//! Public scraper operations.
//!
//! Each operation fetches one page through the rate-limited source, hands
//! the HTML to the extractors and returns typed records. Operations are
//! idempotent at the HTTP level and safe to retry from outside.

use crate::api::{PageFetcher, PageSource, UrlBook};
use crate::error::{Result, ScrapeError};
use crate::extract;
use chrono::Utc;
use shared::{Gender, PersonalBestEntry, RosterEntry};
use tracing::{debug, info, warn};

/// Scraper for the swimrankings.net ranking site
pub struct SwimrankingsScraper<S = PageFetcher> {
    source: S,
    urls: UrlBook,
}

impl<S: PageSource> SwimrankingsScraper<S> {
    /// Create a new scraper over a page source
    pub fn new(source: S, urls: UrlBook) -> Self {
        Self { source, urls }
    }

    pub fn urls(&self) -> &UrlBook {
        &self.urls
    }

    /// Fetch every swimmer registered to a club.
    ///
    /// Male and female swimmers come from separate tables; each entry's
    /// gender is the table it was listed in. Either table may be empty, but
    /// a page listing nobody at all is [`ScrapeError::NotFound`].
    pub async fn fetch_club_roster(&self, club_id: u32) -> Result<Vec<RosterEntry>> {
        info!(club_id = club_id, "Fetching club roster");

        let html = self.source.fetch(&self.urls.club_roster(club_id)).await?;
        let athletes = extract::extract_roster(&html)?;
        if athletes.is_empty() {
            warn!(club_id = club_id, "Club roster page lists no athletes");
            return Err(ScrapeError::NotFound(format!("roster of club {}", club_id)));
        }

        info!(club_id = club_id, athletes = athletes.len(), "Fetched club roster");
        Ok(athletes)
    }

    /// Look up a single swimmer by `"Last, First"` name.
    ///
    /// Returns [`ScrapeError::NotFound`] when the search has no results.
    pub async fn fetch_athlete(&self, full_name: &str) -> Result<RosterEntry> {
        let (last_name, first_name) = full_name
            .split_once(", ")
            .map(|(last, first)| (last.trim(), first.trim()))
            .filter(|(last, first)| !last.is_empty() && !first.is_empty())
            .ok_or_else(|| ScrapeError::InvalidName(full_name.to_string()))?;

        debug!(last_name = %last_name, first_name = %first_name, "Searching athlete");

        let html = self
            .source
            .fetch(&self.urls.athlete_search(last_name, first_name))
            .await?;

        extract::extract_search_result(&html)?
            .ok_or_else(|| ScrapeError::NotFound(full_name.to_string()))
    }

    /// Fetch all personal bests listed for a swimmer
    pub async fn fetch_personal_bests(&self, external_id: u32) -> Result<Vec<PersonalBestEntry>> {
        debug!(external_id = external_id, "Fetching personal bests");

        let html = self
            .source
            .fetch(&self.urls.athlete_detail(external_id))
            .await?;
        let bests = extract::extract_personal_bests(&html, external_id, Utc::now())?;

        debug!(
            external_id = external_id,
            results = bests.len(),
            "Fetched personal bests"
        );
        Ok(bests)
    }

    /// Read a swimmer's gender from their detail page header
    pub async fn fetch_athlete_gender(&self, external_id: u32) -> Result<Gender> {
        let html = self
            .source
            .fetch(&self.urls.athlete_detail(external_id))
            .await?;
        Ok(extract::extract_detail_gender(&html)?)
    }
}
