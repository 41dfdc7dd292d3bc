//! Swimrankings scraper library for club rosters and personal bests.
//!
//! This library fetches pages from swimrankings.net through a single
//! rate-limited client, extracts typed records from the HTML and keeps a
//! local roster in sync with what the site publishes.

pub mod api;
pub mod error;
pub mod extract;
pub mod scraper;
pub mod sync;

pub use api::{PageFetcher, PageSource, RateLimiter, UrlBook};
pub use error::{FetchError, ParseError, ScrapeError};
pub use crate::scraper::SwimrankingsScraper;
pub use sync::{RosterSync, SyncStats};
