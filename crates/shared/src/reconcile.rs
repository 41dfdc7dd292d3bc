//! Reconciliation of freshly scraped records against persisted ones.
//!
//! Records are matched on their external key. The result is a plan of
//! inserts, updates and deletions that the store applies in one transaction.
//! Incoming data always wins on update.

use crate::models::{PersonalBestEntry, RosterEntry};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, warn};

/// A record that can be matched by key and compared field by field
pub trait Reconcilable: Clone {
    type Key: Copy + Eq + Hash + Debug;

    /// Upstream identity of the record
    fn key(&self) -> Self::Key;

    /// Names of the non-key fields whose values differ in `incoming`
    fn changed_fields(&self, incoming: &Self) -> Vec<&'static str>;
}

/// An existing record paired with the incoming version that replaces it
#[derive(Debug, Clone, PartialEq)]
pub struct Update<T> {
    pub existing: T,
    pub incoming: T,
    pub changed: Vec<&'static str>,
}

/// Unit of write work for one sync cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationPlan<T: Reconcilable> {
    pub to_insert: Vec<T>,
    pub to_update: Vec<Update<T>>,
    pub to_delete: HashSet<T::Key>,
}

impl<T: Reconcilable> Default for ReconciliationPlan<T> {
    fn default() -> Self {
        Self {
            to_insert: Vec::new(),
            to_update: Vec::new(),
            to_delete: HashSet::new(),
        }
    }
}

impl<T: Reconcilable> ReconciliationPlan<T> {
    /// True when applying the plan would change nothing
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Diff `incoming` against `existing`.
///
/// Existing records absent from `incoming` are marked for deletion, incoming
/// records without an existing counterpart for insertion, and matching
/// records with any differing field for update. Duplicate keys in `incoming`
/// collapse to their last occurrence.
pub fn plan<T: Reconcilable>(
    existing: &HashMap<T::Key, T>,
    incoming: &[T],
) -> ReconciliationPlan<T> {
    let mut by_key: HashMap<T::Key, &T> = HashMap::with_capacity(incoming.len());
    for record in incoming {
        if by_key.insert(record.key(), record).is_some() {
            warn!(key = ?record.key(), "Duplicate key in incoming records, keeping last");
        }
    }

    let mut result = ReconciliationPlan::default();

    for key in existing.keys() {
        if !by_key.contains_key(key) {
            result.to_delete.insert(*key);
        }
    }

    for (key, record) in by_key {
        match existing.get(&key) {
            None => result.to_insert.push(record.clone()),
            Some(current) => {
                let changed = current.changed_fields(record);
                if !changed.is_empty() {
                    result.to_update.push(Update {
                        existing: current.clone(),
                        incoming: record.clone(),
                        changed,
                    });
                }
            }
        }
    }

    debug!(
        inserts = result.to_insert.len(),
        updates = result.to_update.len(),
        deletes = result.to_delete.len(),
        "Reconciliation planned"
    );

    result
}

/// Like [`plan`], but never schedules deletions.
///
/// Used for records that must only disappear through an explicit action,
/// such as personal bests (removed only when their swimmer is deleted).
pub fn plan_upsert<T: Reconcilable>(
    existing: &HashMap<T::Key, T>,
    incoming: &[T],
) -> ReconciliationPlan<T> {
    let mut result = plan(existing, incoming);
    result.to_delete.clear();
    result
}

/// Index records by key, the shape [`plan`] expects for persisted data
pub fn index_by_key<T: Reconcilable>(records: impl IntoIterator<Item = T>) -> HashMap<T::Key, T> {
    records.into_iter().map(|r| (r.key(), r)).collect()
}

macro_rules! diff_fields {
    ($a:expr, $b:expr, $($field:ident),+ $(,)?) => {{
        let mut changed = Vec::new();
        $(
            if $a.$field != $b.$field {
                changed.push(stringify!($field));
            }
        )+
        changed
    }};
}

impl Reconcilable for RosterEntry {
    type Key = u32;

    fn key(&self) -> u32 {
        self.external_id
    }

    fn changed_fields(&self, incoming: &Self) -> Vec<&'static str> {
        diff_fields!(self, incoming, birth_year, first_name, last_name, gender)
    }
}

impl Reconcilable for PersonalBestEntry {
    type Key = u64;

    fn key(&self) -> u64 {
        self.result_id
    }

    // scraped_at is bookkeeping and never counts as a change
    fn changed_fields(&self, incoming: &Self) -> Vec<&'static str> {
        diff_fields!(
            self,
            incoming,
            athlete_id,
            style_id,
            meet_id,
            scoring_version,
            event_label,
            course,
            time,
            points,
            date,
            city,
            meet_name,
        )
    }
}
