//! Network access to the ranking site.
//!
//! This module provides a rate-limited page fetcher and the URL templates
//! for the pages the scraper reads.

pub mod client;
pub mod rate_limiter;
pub mod urls;

pub use client::{PageFetcher, PageSource};
pub use rate_limiter::{RateLimitGuard, RateLimiter};
pub use urls::UrlBook;
