//! Roster rows: club ranking tables and athlete search results.

use super::{attr, ids, select_first, selector, text};
use crate::error::ParseError;
use scraper::{ElementRef, Html};
use shared::{Gender, RosterEntry};
use tracing::debug;

/// Layout table wrapping the per-gender athlete lists
const ROSTER_WRAPPER: &str = r#"table[cellspacing="0"][cellpadding="0"][border="0"]"#;
const ATHLETE_LIST: &str = "table.athleteList";
const ROSTER_ROWS: &str = "tr.athleteSearch0, tr.athleteSearch1";
const SEARCH_TABLE: &str = "table.athleteSearch";
const SEARCH_FIRST_ROW: &str = "tr.athleteSearch0";
const NAME_LINK: &str = "td.name a";
const BIRTH_YEAR: &str = "td.date";
const DETAIL_GENDER_ICON: &str = r#"div#header_athleteDetail img[align="top"]"#;

/// Zero-based index of the cell holding the gender icon in mixed tables
const GENDER_CELL: usize = 3;

/// Where a row's gender comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenderSource {
    /// The row sits in a gender-segmented table
    Segment(Gender),
    /// The row carries its own gender icon (mixed tables)
    RowIcon,
}

/// Map a gender icon path (`images/gender1.png`) to a gender
pub fn gender_from_icon(src: &str) -> Result<Gender, ParseError> {
    match src.rsplit('/').next() {
        Some("gender1.png") => Ok(Gender::Male),
        Some("gender2.png") => Ok(Gender::Female),
        _ => Err(ParseError::invalid("gender icon", src)),
    }
}

/// Title case: upper-case the first letter of every
/// alphabetic run, lower-case the rest (`O'NEIL-SMITH` → `O'Neil-Smith`)
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Split the upstream `"Last, First"` display name
fn split_name(display: &str) -> Result<(String, String), ParseError> {
    let (last, first) = display
        .split_once(", ")
        .ok_or_else(|| ParseError::invalid("athlete name", display))?;
    let (last, first) = (last.trim(), first.trim());
    if last.is_empty() || first.is_empty() {
        return Err(ParseError::invalid("athlete name", display));
    }
    Ok((title_case(last), first.to_string()))
}

fn row_gender(row: ElementRef<'_>) -> Result<Gender, ParseError> {
    let cells = selector("td")?;
    let cell = row
        .select(&cells)
        .nth(GENDER_CELL)
        .ok_or_else(|| ParseError::missing(format!("td #{} (gender)", GENDER_CELL + 1)))?;
    let icon = select_first(cell, "img")?;
    gender_from_icon(attr(icon, "gender icon img", "src")?)
}

/// Parse one athlete row into a roster entry
pub fn parse_athlete_row(row: ElementRef<'_>, gender: GenderSource) -> Result<RosterEntry, ParseError> {
    let link = select_first(row, NAME_LINK)?;
    let (last_name, first_name) = split_name(&text(link))?;
    let external_id = ids::athlete_id(attr(link, NAME_LINK, "href")?)?;

    let birth_year_text = text(select_first(row, BIRTH_YEAR)?);
    let birth_year = birth_year_text
        .parse()
        .map_err(|_| ParseError::invalid("birth year", birth_year_text))?;

    let gender = match gender {
        GenderSource::Segment(gender) => gender,
        GenderSource::RowIcon => row_gender(row)?,
    };

    Ok(RosterEntry {
        external_id,
        birth_year,
        first_name,
        last_name,
        gender,
    })
}

fn extract_segment(table: ElementRef<'_>, gender: Gender) -> Result<Vec<RosterEntry>, ParseError> {
    let rows = selector(ROSTER_ROWS)?;
    table
        .select(&rows)
        .map(|row| parse_athlete_row(row, GenderSource::Segment(gender)))
        .collect()
}

/// Extract a club roster page.
///
/// The page lists male swimmers in the first athlete table and female
/// swimmers in the second.
pub fn extract_roster(html: &str) -> Result<Vec<RosterEntry>, ParseError> {
    let document = Html::parse_document(html);
    let wrapper_sel = selector(ROSTER_WRAPPER)?;
    let list_sel = selector(ATHLETE_LIST)?;

    let wrapper = document
        .select(&wrapper_sel)
        .find(|table| table.select(&list_sel).next().is_some())
        .ok_or_else(|| ParseError::missing(format!("{} containing {}", ROSTER_WRAPPER, ATHLETE_LIST)))?;

    let segments: Vec<ElementRef<'_>> = wrapper.select(&list_sel).collect();
    let male = segments
        .first()
        .ok_or_else(|| ParseError::missing(format!("{} (male segment)", ATHLETE_LIST)))?;
    let female = segments
        .get(1)
        .ok_or_else(|| ParseError::missing(format!("{} (female segment)", ATHLETE_LIST)))?;

    let mut athletes = extract_segment(*male, Gender::Male)?;
    let male_count = athletes.len();
    athletes.extend(extract_segment(*female, Gender::Female)?);

    debug!(
        male = male_count,
        female = athletes.len() - male_count,
        "Extracted roster"
    );

    Ok(athletes)
}

/// Extract the first hit of an athlete search page.
///
/// Returns `Ok(None)` when the results table is present but empty.
pub fn extract_search_result(html: &str) -> Result<Option<RosterEntry>, ParseError> {
    let document = Html::parse_document(html);
    let table = select_first(document.root_element(), SEARCH_TABLE)?;

    let row_sel = selector(SEARCH_FIRST_ROW)?;
    match table.select(&row_sel).next() {
        Some(row) => parse_athlete_row(row, GenderSource::RowIcon).map(Some),
        None => Ok(None),
    }
}

/// Read the gender icon from an athlete detail page header
pub fn extract_detail_gender(html: &str) -> Result<Gender, ParseError> {
    let document = Html::parse_document(html);
    let icon = select_first(document.root_element(), DETAIL_GENDER_ICON)?;
    gender_from_icon(attr(icon, DETAIL_GENDER_ICON, "src")?)
}
