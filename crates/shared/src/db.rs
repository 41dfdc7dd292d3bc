//! Database operations for SQLite.
//!
//! This module handles all database connections, schema creation, and migrations.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// Current schema version, stored in the user_version pragma
pub const SCHEMA_VERSION: i32 = 1;

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let is_new = !path.exists();

        debug!(path = %path.display(), "Opening database");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;

        // Enable foreign keys
        conn.execute("PRAGMA foreign_keys = ON", [])
            .context("Failed to enable foreign keys")?;

        let mut db = Self { conn };

        if is_new {
            info!("Creating new database schema");
            db.create_schema()?;
        } else {
            debug!("Database already exists");
            // Run migrations for existing databases
            db.run_migrations()?;
        }

        Ok(db)
    }

    /// Create the database schema
    fn create_schema(&mut self) -> Result<()> {
        self.conn
            .execute_batch(include_str!("../schema.sql"))
            .context("Failed to create database schema")?;

        info!("Database schema created successfully");
        Ok(())
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Check if a table exists
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get the database version (from user_version pragma)
    pub fn get_version(&self) -> Result<i32> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    /// Set the database version
    pub fn set_version(&self, version: i32) -> Result<()> {
        self.conn
            .execute_batch(&format!("PRAGMA user_version = {}", version))?;
        Ok(())
    }

    /// Run migrations for existing databases
    fn run_migrations(&mut self) -> Result<()> {
        if !self.table_exists("swimmers")? {
            info!("Running migration: Creating full schema in empty database");
            return self.create_schema();
        }

        // Databases from before personal bests were tracked only hold swimmers
        if !self.table_exists("personal_bests")? {
            info!("Running migration: Creating personal_bests table");
            self.conn
                .execute_batch(
                    "CREATE TABLE IF NOT EXISTS personal_bests (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    result_id INTEGER NOT NULL UNIQUE,
                    athlete_id INTEGER NOT NULL,
                    style_id INTEGER NOT NULL,
                    meet_id INTEGER NOT NULL,
                    scoring_version TEXT NOT NULL,
                    event_label TEXT NOT NULL,
                    course INTEGER NOT NULL CHECK(course IN (0, 1)),
                    time_ms INTEGER NOT NULL,
                    points INTEGER NOT NULL CHECK(points >= 0),
                    date DATE NOT NULL,
                    city TEXT NOT NULL,
                    meet_name TEXT NOT NULL,
                    scraped_at TIMESTAMP NOT NULL,
                    FOREIGN KEY (athlete_id) REFERENCES swimmers(external_id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_personal_bests_athlete
                ON personal_bests(athlete_id);",
                )
                .context("Failed to create personal_bests table")?;
            info!("Migration completed: personal_bests table created");
        }

        if self.get_version()? < SCHEMA_VERSION {
            self.set_version(SCHEMA_VERSION)?;
        }

        Ok(())
    }

    /// Begin a transaction
    pub fn begin_transaction(&mut self) -> Result<rusqlite::Transaction<'_>> {
        self.conn.transaction().context("Failed to begin transaction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_database() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("test.db");

        let db = Database::open(&db_path)?;
        assert!(db_path.exists());

        // Check that tables were created
        assert!(db.table_exists("swimmers")?);
        assert!(db.table_exists("personal_bests")?);
        assert_eq!(db.get_version()?, SCHEMA_VERSION);

        Ok(())
    }

    #[test]
    fn test_creates_parent_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("nested").join("club.db");

        Database::open(&db_path)?;
        assert!(db_path.exists());

        Ok(())
    }

    #[test]
    fn test_migrates_roster_only_database() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("old.db");

        {
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(
                "CREATE TABLE swimmers (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    external_id INTEGER NOT NULL UNIQUE,
                    birth_year INTEGER NOT NULL,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    gender INTEGER NOT NULL,
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                );",
            )?;
        }

        let db = Database::open(&db_path)?;
        assert!(db.table_exists("personal_bests")?);
        assert_eq!(db.get_version()?, SCHEMA_VERSION);

        Ok(())
    }

    #[test]
    fn test_version() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("test.db");

        let db = Database::open(&db_path)?;

        db.set_version(7)?;
        assert_eq!(db.get_version()?, 7);

        Ok(())
    }
}
