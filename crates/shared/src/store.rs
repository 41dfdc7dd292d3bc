//! Roster persistence.
//!
//! This module provides a high-level API over the SQLite database for the
//! swimmer roster and personal bests. Writes happen only through
//! reconciliation plans, each applied in a single transaction.

use crate::models::*;
use crate::reconcile::ReconciliationPlan;
use crate::Database;
use anyhow::{bail, Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;
use std::num::TryFromIntError;
use std::time::Duration;
use tracing::{debug, info};

/// Counts of rows written by one plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// Swimmer roster store
pub struct SwimmerStore {
    db: Database,
}

impl SwimmerStore {
    /// Create a new store over the given database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Load every stored swimmer keyed by external id
    pub fn load_roster(&self) -> Result<HashMap<u32, RosterEntry>> {
        let conn = self.db.conn();

        let mut stmt = conn.prepare(
            "SELECT external_id, birth_year, first_name, last_name, gender FROM swimmers",
        )?;

        let swimmers = stmt
            .query_map([], row_to_swimmer)?
            .map(|row| row.map(|s| (s.external_id, s)))
            .collect::<Result<HashMap<_, _>, _>>()
            .context("Failed to load roster")?;

        Ok(swimmers)
    }

    /// Look up a single swimmer
    pub fn get_swimmer(&self, external_id: u32) -> Result<Option<RosterEntry>> {
        self.db
            .conn()
            .query_row(
                "SELECT external_id, birth_year, first_name, last_name, gender
                 FROM swimmers WHERE external_id = ?1",
                params![external_id],
                row_to_swimmer,
            )
            .optional()
            .context("Failed to query swimmer")
    }

    /// Number of stored swimmers
    pub fn roster_count(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .conn()
            .query_row("SELECT COUNT(*) FROM swimmers", [], |row| row.get(0))?;
        Ok(usize::try_from(count)?)
    }

    /// Apply a roster plan atomically.
    ///
    /// Deleting a swimmer cascades to their personal bests.
    pub fn apply_roster_plan(&mut self, plan: &ReconciliationPlan<RosterEntry>) -> Result<ApplyStats> {
        let mut stats = ApplyStats::default();

        if plan.is_empty() {
            debug!("Roster plan is empty, nothing to apply");
            return Ok(stats);
        }

        let tx = self.db.begin_transaction()?;

        for external_id in &plan.to_delete {
            stats.deleted += tx
                .execute(
                    "DELETE FROM swimmers WHERE external_id = ?1",
                    params![external_id],
                )
                .with_context(|| format!("Failed to delete swimmer {}", external_id))?;
        }

        for swimmer in &plan.to_insert {
            tx.execute(
                "INSERT INTO swimmers (external_id, birth_year, first_name, last_name, gender)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    swimmer.external_id,
                    swimmer.birth_year,
                    swimmer.first_name,
                    swimmer.last_name,
                    swimmer.gender.code(),
                ],
            )
            .with_context(|| format!("Failed to insert swimmer {}", swimmer.external_id))?;
            stats.inserted += 1;
        }

        for update in &plan.to_update {
            let swimmer = &update.incoming;
            stats.updated += tx
                .execute(
                    "UPDATE swimmers
                     SET birth_year = ?1, first_name = ?2, last_name = ?3, gender = ?4,
                         updated_at = CURRENT_TIMESTAMP
                     WHERE external_id = ?5",
                    params![
                        swimmer.birth_year,
                        swimmer.first_name,
                        swimmer.last_name,
                        swimmer.gender.code(),
                        swimmer.external_id,
                    ],
                )
                .with_context(|| format!("Failed to update swimmer {}", swimmer.external_id))?;

            debug!(
                external_id = swimmer.external_id,
                changed = ?update.changed,
                "Updated swimmer"
            );
        }

        tx.commit().context("Failed to commit roster plan")?;

        info!(
            inserted = stats.inserted,
            updated = stats.updated,
            deleted = stats.deleted,
            "Applied roster plan"
        );

        Ok(stats)
    }

    /// Load a swimmer's personal bests keyed by result id
    pub fn load_personal_bests(&self, athlete_id: u32) -> Result<HashMap<u64, PersonalBestEntry>> {
        let conn = self.db.conn();

        let mut stmt = conn.prepare(
            "SELECT athlete_id, style_id, result_id, meet_id, scoring_version, event_label,
                    course, time_ms, points, date, city, meet_name, scraped_at
             FROM personal_bests WHERE athlete_id = ?1",
        )?;

        let bests = stmt
            .query_map(params![athlete_id], row_to_personal_best)?
            .map(|row| row.map(|pb| (pb.result_id, pb)))
            .collect::<Result<HashMap<_, _>, _>>()
            .context("Failed to load personal bests")?;

        Ok(bests)
    }

    /// Number of stored personal bests for a swimmer
    pub fn personal_best_count(&self, athlete_id: u32) -> Result<usize> {
        let count: i64 = self.db.conn().query_row(
            "SELECT COUNT(*) FROM personal_bests WHERE athlete_id = ?1",
            params![athlete_id],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count)?)
    }

    /// Apply a personal-best plan for one swimmer atomically.
    ///
    /// The swimmer must already be stored, and every record in the plan
    /// must belong to them.
    pub fn apply_personal_best_plan(
        &mut self,
        athlete_id: u32,
        plan: &ReconciliationPlan<PersonalBestEntry>,
    ) -> Result<ApplyStats> {
        if self.get_swimmer(athlete_id)?.is_none() {
            bail!("Swimmer {} does not exist, cannot store personal bests", athlete_id);
        }

        let foreign = plan
            .to_insert
            .iter()
            .chain(plan.to_update.iter().map(|u| &u.incoming))
            .find(|pb| pb.athlete_id != athlete_id);
        if let Some(pb) = foreign {
            bail!(
                "Result {} belongs to swimmer {}, not {}",
                pb.result_id,
                pb.athlete_id,
                athlete_id
            );
        }

        let mut stats = ApplyStats::default();

        if plan.is_empty() {
            return Ok(stats);
        }

        let tx = self.db.begin_transaction()?;

        for result_id in &plan.to_delete {
            stats.deleted += tx.execute(
                "DELETE FROM personal_bests WHERE result_id = ?1 AND athlete_id = ?2",
                params![sql_result_id(*result_id)?, athlete_id],
            )?;
        }

        for pb in &plan.to_insert {
            tx.execute(
                "INSERT INTO personal_bests (
                    result_id, athlete_id, style_id, meet_id, scoring_version, event_label,
                    course, time_ms, points, date, city, meet_name, scraped_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    sql_result_id(pb.result_id)?,
                    pb.athlete_id,
                    pb.style_id,
                    pb.meet_id,
                    pb.scoring_version,
                    pb.event_label,
                    pb.course.code(),
                    sql_time_ms(pb)?,
                    pb.points,
                    pb.date,
                    pb.city,
                    pb.meet_name,
                    pb.scraped_at,
                ],
            )
            .with_context(|| format!("Failed to insert result {}", pb.result_id))?;
            stats.inserted += 1;
        }

        for update in &plan.to_update {
            let pb = &update.incoming;
            stats.updated += tx
                .execute(
                    "UPDATE personal_bests
                     SET style_id = ?1, meet_id = ?2, scoring_version = ?3, event_label = ?4,
                         course = ?5, time_ms = ?6, points = ?7, date = ?8, city = ?9,
                         meet_name = ?10, scraped_at = ?11
                     WHERE result_id = ?12",
                    params![
                        pb.style_id,
                        pb.meet_id,
                        pb.scoring_version,
                        pb.event_label,
                        pb.course.code(),
                        sql_time_ms(pb)?,
                        pb.points,
                        pb.date,
                        pb.city,
                        pb.meet_name,
                        pb.scraped_at,
                        sql_result_id(pb.result_id)?,
                    ],
                )
                .with_context(|| format!("Failed to update result {}", pb.result_id))?;
        }

        tx.commit().context("Failed to commit personal best plan")?;

        debug!(
            athlete_id = athlete_id,
            inserted = stats.inserted,
            updated = stats.updated,
            deleted = stats.deleted,
            "Applied personal best plan"
        );

        Ok(stats)
    }
}

fn invalid_code(idx: usize, err: ModelError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(err))
}

/// Read an integer column, rejecting values outside the range of `T`
fn int_column<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: TryFrom<i64, Error = TryFromIntError>,
{
    let value: i64 = row.get(idx)?;
    T::try_from(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

fn sql_result_id(result_id: u64) -> Result<i64> {
    i64::try_from(result_id).with_context(|| format!("Result id {} does not fit SQLite", result_id))
}

fn sql_time_ms(pb: &PersonalBestEntry) -> Result<i64> {
    i64::try_from(pb.time.as_millis())
        .with_context(|| format!("Time of result {} does not fit SQLite", pb.result_id))
}

/// Helper: Convert a database row to a RosterEntry
fn row_to_swimmer(row: &rusqlite::Row) -> rusqlite::Result<RosterEntry> {
    Ok(RosterEntry {
        external_id: int_column(row, 0)?,
        birth_year: int_column(row, 1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        gender: Gender::try_from(row.get::<_, i64>(4)?).map_err(|e| invalid_code(4, e))?,
    })
}

/// Helper: Convert a database row to a PersonalBestEntry
fn row_to_personal_best(row: &rusqlite::Row) -> rusqlite::Result<PersonalBestEntry> {
    Ok(PersonalBestEntry {
        athlete_id: int_column(row, 0)?,
        style_id: int_column(row, 1)?,
        result_id: int_column(row, 2)?,
        meet_id: int_column(row, 3)?,
        scoring_version: row.get(4)?,
        event_label: row.get(5)?,
        course: Course::try_from(row.get::<_, i64>(6)?).map_err(|e| invalid_code(6, e))?,
        time: Duration::from_millis(int_column(row, 7)?),
        points: int_column(row, 8)?,
        date: row.get(9)?,
        city: row.get(10)?,
        meet_name: row.get(11)?,
        scraped_at: row.get(12)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{plan, plan_upsert};
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> Result<SwimmerStore> {
        Ok(SwimmerStore::new(Database::open(dir.path().join("club.db"))?))
    }

    fn swimmer(id: u32, first: &str, last: &str, gender: Gender) -> RosterEntry {
        RosterEntry {
            external_id: id,
            birth_year: 2005,
            first_name: first.to_string(),
            last_name: last.to_string(),
            gender,
        }
    }

    fn best(athlete_id: u32, result_id: u64, points: u32) -> PersonalBestEntry {
        PersonalBestEntry {
            athlete_id,
            style_id: 2,
            result_id,
            meet_id: 612345,
            scoring_version: "World Aquatics 2024".to_string(),
            event_label: "100m Freestyle".to_string(),
            course: Course::Short,
            time: Duration::from_millis(61_234),
            points,
            date: NaiveDate::from_ymd_opt(2024, 12, 7).unwrap(),
            city: "Leeds".to_string(),
            meet_name: "Winter Meet".to_string(),
            scraped_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn test_apply_roster_plan() -> Result<()> {
        let dir = TempDir::new()?;
        let mut store = open_store(&dir)?;

        let initial = vec![
            swimmer(1234567, "John", "Doe", Gender::Male),
            swimmer(7654321, "Jane", "Roe", Gender::Female),
        ];
        let stats = store.apply_roster_plan(&plan(&store.load_roster()?, &initial))?;
        assert_eq!(stats.inserted, 2);
        assert_eq!(store.roster_count()?, 2);

        let next = vec![
            swimmer(1234567, "Johnny", "Doe", Gender::Male),
            swimmer(1111111, "Max", "Moe", Gender::Male),
        ];
        let stats = store.apply_roster_plan(&plan(&store.load_roster()?, &next))?;
        assert_eq!(
            stats,
            ApplyStats {
                inserted: 1,
                updated: 1,
                deleted: 1
            }
        );

        let roster = store.load_roster()?;
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[&1234567].first_name, "Johnny");
        assert!(!roster.contains_key(&7654321));

        // Second pass with the same data writes nothing
        assert!(plan(&roster, &next).is_empty());

        Ok(())
    }

    #[test]
    fn test_round_trips_personal_bests() -> Result<()> {
        let dir = TempDir::new()?;
        let mut store = open_store(&dir)?;
        store.apply_roster_plan(&plan(
            &HashMap::new(),
            &[swimmer(1234567, "John", "Doe", Gender::Male)],
        ))?;

        let bests = vec![best(1234567, 10, 500), best(1234567, 11, 0)];
        let stats = store.apply_personal_best_plan(
            1234567,
            &plan_upsert(&store.load_personal_bests(1234567)?, &bests),
        )?;
        assert_eq!(stats.inserted, 2);

        let loaded = store.load_personal_bests(1234567)?;
        assert_eq!(loaded[&10], bests[0]);
        assert_eq!(loaded[&11], bests[1]);

        let updated = vec![best(1234567, 10, 540)];
        let stats = store.apply_personal_best_plan(1234567, &plan_upsert(&loaded, &updated))?;
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.deleted, 0);
        assert_eq!(store.personal_best_count(1234567)?, 2);
        assert_eq!(store.load_personal_bests(1234567)?[&10].points, 540);

        Ok(())
    }

    #[test]
    fn test_personal_bests_require_owner() -> Result<()> {
        let dir = TempDir::new()?;
        let mut store = open_store(&dir)?;

        let result = store.apply_personal_best_plan(
            42,
            &plan_upsert(&HashMap::new(), &[best(42, 10, 500)]),
        );
        assert!(result.is_err());
        assert_eq!(store.personal_best_count(42)?, 0);

        Ok(())
    }

    #[test]
    fn test_rejects_foreign_personal_bests() -> Result<()> {
        let dir = TempDir::new()?;
        let mut store = open_store(&dir)?;
        store.apply_roster_plan(&plan(
            &HashMap::new(),
            &[swimmer(1234567, "John", "Doe", Gender::Male)],
        ))?;

        let result = store.apply_personal_best_plan(
            1234567,
            &plan_upsert(&HashMap::new(), &[best(7654321, 10, 500)]),
        );
        assert!(result.is_err());

        Ok(())
    }

    #[test]
    fn test_roster_deletion_cascades() -> Result<()> {
        let dir = TempDir::new()?;
        let mut store = open_store(&dir)?;
        store.apply_roster_plan(&plan(
            &HashMap::new(),
            &[swimmer(1234567, "John", "Doe", Gender::Male)],
        ))?;
        store.apply_personal_best_plan(
            1234567,
            &plan_upsert(&HashMap::new(), &[best(1234567, 10, 500)]),
        )?;

        let stats = store.apply_roster_plan(&plan(&store.load_roster()?, &[]))?;
        assert_eq!(stats.deleted, 1);
        assert_eq!(store.personal_best_count(1234567)?, 0);

        Ok(())
    }

    #[test]
    fn test_get_swimmer() -> Result<()> {
        let dir = TempDir::new()?;
        let mut store = open_store(&dir)?;
        let jane = swimmer(7654321, "Jane", "Roe", Gender::Female);
        store.apply_roster_plan(&plan(&HashMap::new(), &[jane.clone()]))?;

        assert_eq!(store.get_swimmer(7654321)?, Some(jane));
        assert_eq!(store.get_swimmer(1)?, None);

        Ok(())
    }

    #[test]
    fn test_out_of_range_columns_are_errors() -> Result<()> {
        let dir = TempDir::new()?;
        let mut store = open_store(&dir)?;
        store.apply_roster_plan(&plan(
            &HashMap::new(),
            &[swimmer(1234567, "John", "Doe", Gender::Male)],
        ))?;
        store.apply_personal_best_plan(
            1234567,
            &plan_upsert(&HashMap::new(), &[best(1234567, 10, 500)]),
        )?;

        store
            .db
            .conn()
            .execute("UPDATE personal_bests SET time_ms = -1 WHERE result_id = 10", [])?;
        assert!(store.load_personal_bests(1234567).is_err());

        store.db.conn().execute(
            "INSERT INTO swimmers (external_id, birth_year, first_name, last_name, gender)
             VALUES (-5, 2005, 'Negative', 'Id', 0)",
            [],
        )?;
        assert!(store.load_roster().is_err());

        Ok(())
    }

    #[test]
    fn test_unrepresentable_result_id_is_rejected() -> Result<()> {
        let dir = TempDir::new()?;
        let mut store = open_store(&dir)?;
        store.apply_roster_plan(&plan(
            &HashMap::new(),
            &[swimmer(1234567, "John", "Doe", Gender::Male)],
        ))?;

        let result = store.apply_personal_best_plan(
            1234567,
            &plan_upsert(&HashMap::new(), &[best(1234567, u64::MAX, 500)]),
        );
        assert!(result.is_err());
        assert_eq!(store.personal_best_count(1234567)?, 0);

        Ok(())
    }
}
