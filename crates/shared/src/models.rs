//! Data models for the club roster.
//!
//! This module defines the records produced by the scraper and persisted by
//! the store: roster entries (one per swimmer) and personal bests (many per
//! swimmer).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors converting stored codes back into model enums
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid gender code: {0}")]
    InvalidGender(i64),

    #[error("Invalid course code: {0}")]
    InvalidCourse(i64),

    #[error("Invalid gender: {0}")]
    UnknownGender(String),

    #[error("Invalid course: {0}")]
    UnknownCourse(String),
}

/// Swimmer gender as published by the ranking site
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Integer code used in the database (0: man, 1: woman)
    pub fn code(self) -> i64 {
        match self {
            Gender::Male => 0,
            Gender::Female => 1,
        }
    }
}

impl TryFrom<i64> for Gender {
    type Error = ModelError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Gender::Male),
            1 => Ok(Gender::Female),
            other => Err(ModelError::InvalidGender(other)),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "MALE"),
            Gender::Female => write!(f, "FEMALE"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            _ => Err(ModelError::UnknownGender(s.to_string())),
        }
    }
}

/// Pool length category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Course {
    /// 25m pool
    Short = 0,
    /// 50m pool
    Long = 1,
}

impl Course {
    pub fn code(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for Course {
    type Error = ModelError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Course::Short),
            1 => Ok(Course::Long),
            other => Err(ModelError::InvalidCourse(other)),
        }
    }
}

impl std::fmt::Display for Course {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Course::Short => write!(f, "SHORT"),
            Course::Long => write!(f, "LONG"),
        }
    }
}

impl std::str::FromStr for Course {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHORT" => Ok(Course::Short),
            "LONG" => Ok(Course::Long),
            _ => Err(ModelError::UnknownCourse(s.to_string())),
        }
    }
}

/// A swimmer registered to the club
///
/// Identity is `external_id`, the stable key issued by the ranking site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterEntry {
    pub external_id: u32,
    pub birth_year: i32,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
}

/// A swimmer's fastest recorded time for one event/course combination
///
/// Identity is `result_id`. `athlete_id` is the owning swimmer's
/// `external_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonalBestEntry {
    pub athlete_id: u32,
    pub style_id: u32,
    pub result_id: u64,
    pub meet_id: u32,
    pub scoring_version: String,
    pub event_label: String,
    pub course: Course,
    pub time: Duration,
    pub points: u32,
    pub date: NaiveDate,
    pub city: String,
    pub meet_name: String,
    pub scraped_at: DateTime<Utc>,
}
