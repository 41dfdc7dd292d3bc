//! Personal-best rows from an athlete detail page.

use super::{attr, ids, parse_race_time, select_first, selector, text};
use crate::error::ParseError;
use chrono::{DateTime, NaiveDate, Utc};
use scraper::{ElementRef, Html};
use shared::{Course, PersonalBestEntry};

const SCORING_OPTION: &str = r#"select[name="points"] option[selected]"#;
const BEST_TABLE: &str = "table.athleteBest";
const EVENT_LINK: &str = "td.event a";
const COURSE_CELL: &str = "td.course";
const TIME_LINK: &str = "td.time a";
const POINTS_CELL: &str = "td.code";
const DATE_CELL: &str = "td.date";
const CITY_LINK: &str = "td.city a";

/// Meet dates look like `14 Jun 2025`
const DATE_FORMAT: &str = "%d %b %Y";

/// Course code from the first two characters of the course cell (`50m`)
pub fn parse_course(value: &str) -> Result<Course, ParseError> {
    match value.trim().get(..2) {
        Some("25") => Ok(Course::Short),
        Some("50") => Ok(Course::Long),
        _ => Err(ParseError::invalid("course", value)),
    }
}

/// Points cell; `-` means the result was not scored
pub fn parse_points(value: &str) -> Result<u32, ParseError> {
    match value.trim() {
        "-" => Ok(0),
        points => points
            .parse()
            .map_err(|_| ParseError::invalid("points", value)),
    }
}

pub fn parse_meet_date(value: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ParseError::invalid("date", value))
}

/// Label of the scoring system pre-selected in the points dropdown
fn scoring_version(document: &Html) -> Result<String, ParseError> {
    let label = text(select_first(document.root_element(), SCORING_OPTION)?);
    if label.is_empty() {
        return Err(ParseError::invalid("scoring version", label));
    }
    Ok(label)
}

fn parse_result_row(
    row: ElementRef<'_>,
    athlete_id: u32,
    scoring_version: &str,
    scraped_at: DateTime<Utc>,
) -> Result<PersonalBestEntry, ParseError> {
    let event = select_first(row, EVENT_LINK)?;
    let time = select_first(row, TIME_LINK)?;
    let city = select_first(row, CITY_LINK)?;

    Ok(PersonalBestEntry {
        athlete_id,
        style_id: ids::style_id(attr(event, EVENT_LINK, "href")?)?,
        result_id: ids::result_id(attr(time, TIME_LINK, "href")?)?,
        meet_id: ids::meet_id(attr(city, CITY_LINK, "href")?)?,
        scoring_version: scoring_version.to_string(),
        event_label: text(event),
        course: parse_course(&text(select_first(row, COURSE_CELL)?))?,
        time: parse_race_time(&text(time))?,
        points: parse_points(&text(select_first(row, POINTS_CELL)?))?,
        date: parse_meet_date(&text(select_first(row, DATE_CELL)?))?,
        city: text(city),
        meet_name: attr(city, CITY_LINK, "title")?.trim().to_string(),
        scraped_at,
    })
}

/// Extract every personal best listed on an athlete detail page.
///
/// The first row of the table is its header and is skipped. A table with
/// no result rows yields an empty list.
pub fn extract_personal_bests(
    html: &str,
    athlete_id: u32,
    scraped_at: DateTime<Utc>,
) -> Result<Vec<PersonalBestEntry>, ParseError> {
    let document = Html::parse_document(html);
    let scoring = scoring_version(&document)?;
    let table = select_first(document.root_element(), BEST_TABLE)?;

    let rows = selector("tr")?;
    table
        .select(&rows)
        .skip(1)
        .map(|row| parse_result_row(row, athlete_id, &scoring, scraped_at))
        .collect()
}
