//! URL templates for the ranking site.

use reqwest::Url;
use shared::config::RosterQueryConfig;

/// Builds the upstream page URLs from one base entry point
#[derive(Debug, Clone)]
pub struct UrlBook {
    base: Url,
    roster: RosterQueryConfig,
}

impl UrlBook {
    /// `base` is the site's entry script, e.g. `https://www.swimrankings.net/index.php`
    pub fn new(base: &str, roster: RosterQueryConfig) -> anyhow::Result<Self> {
        let base = Url::parse(base)?;
        Ok(Self { base, roster })
    }

    fn with_query(&self, pairs: &[(&str, String)]) -> String {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        url.into()
    }

    /// Club ranking page listing male and female swimmers in separate tables
    pub fn club_roster(&self, club_id: u32) -> String {
        self.with_query(&[
            ("page", "rankingDetail".to_string()),
            ("clubId", club_id.to_string()),
            ("gender", "1".to_string()),
            ("season", self.roster.season.to_string()),
            ("course", self.roster.course.clone()),
            ("agegroup", "0".to_string()),
            ("stroke", self.roster.stroke.to_string()),
        ])
    }

    /// Athlete search across all clubs and genders
    pub fn athlete_search(&self, last_name: &str, first_name: &str) -> String {
        self.with_query(&[
            ("internalRequest", "athleteFind".to_string()),
            ("athlete_clubId", "-1".to_string()),
            ("athlete_gender", "-1".to_string()),
            ("athlete_lastname", last_name.to_string()),
            ("athlete_firstname", first_name.to_string()),
        ])
    }

    /// Athlete detail page with personal bests
    pub fn athlete_detail(&self, athlete_id: u32) -> String {
        self.with_query(&[
            ("page", "athleteDetail".to_string()),
            ("athleteId", athlete_id.to_string()),
        ])
    }
}
