//! Shared library for the swim club roster tools.
//!
//! This crate provides common functionality used by the scraper and any
//! caller that persists its output:
//! - Configuration management
//! - Logging infrastructure
//! - Roster and personal-best data models
//! - Reconciliation of scraped records against stored ones
//! - SQLite database and roster store

pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod reconcile;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use logging::LogConfig;
pub use models::*;
pub use reconcile::{plan, plan_upsert, Reconcilable, ReconciliationPlan, Update};
pub use store::{ApplyStats, SwimmerStore};

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
