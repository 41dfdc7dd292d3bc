//! Race time parsing.
//!
//! Times are published as `H:MM:SS.fff`, `MM:SS.fff` or `SS.fff`. Formats
//! are tried in that order and the first match wins.

use crate::error::ParseError;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
enum RaceTimeFormat {
    /// `H:MM:SS.fff`
    HoursMinutesSeconds,
    /// `MM:SS.fff`
    MinutesSeconds,
    /// `SS.fff`
    Seconds,
}

const FORMATS: [RaceTimeFormat; 3] = [
    RaceTimeFormat::HoursMinutesSeconds,
    RaceTimeFormat::MinutesSeconds,
    RaceTimeFormat::Seconds,
];

/// Parse an all-digit field of `min..=max` characters
fn number(field: &str, min: usize, max: usize) -> Option<u64> {
    if field.len() < min || field.len() > max || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// `SS.fff` with 1-3 fraction digits, returned as milliseconds
fn seconds_millis(field: &str, min_digits: usize) -> Option<u64> {
    let (whole, fraction) = field.split_once('.')?;
    let seconds = number(whole, min_digits, 2)?;
    let fraction_value = number(fraction, 1, 3)?;
    let millis = fraction_value * 10u64.pow(3 - fraction.len() as u32);
    Some(seconds * 1000 + millis)
}

impl RaceTimeFormat {
    fn parse(self, value: &str) -> Option<Duration> {
        let fields: Vec<&str> = value.split(':').collect();

        let millis = match (self, fields.as_slice()) {
            (RaceTimeFormat::HoursMinutesSeconds, [h, m, s]) => {
                let hours = number(h, 1, 2)?;
                let minutes = number(m, 2, 2).filter(|m| *m < 60)?;
                let seconds = seconds_millis(s, 2).filter(|ms| *ms < 60_000)?;
                (hours * 60 + minutes) * 60_000 + seconds
            }
            (RaceTimeFormat::MinutesSeconds, [m, s]) => {
                let minutes = number(m, 1, 2)?;
                let seconds = seconds_millis(s, 2).filter(|ms| *ms < 60_000)?;
                minutes * 60_000 + seconds
            }
            (RaceTimeFormat::Seconds, [s]) => seconds_millis(s, 1)?,
            _ => return None,
        };

        Some(Duration::from_millis(millis))
    }
}

/// Parse a published race time into a duration
pub fn parse_race_time(value: &str) -> Result<Duration, ParseError> {
    let value = value.trim();
    FORMATS
        .iter()
        .find_map(|format| format.parse(value))
        .ok_or_else(|| ParseError::invalid("race time", value))
}
