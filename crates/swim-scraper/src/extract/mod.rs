//! Extraction of typed records from ranking-site HTML.
//!
//! Every assumption about the shape of the upstream pages lives in this
//! module. Extraction is all-or-nothing per page: a missing tag, attribute
//! or malformed cell fails the whole page with a [`ParseError`] naming what
//! was missing.

pub mod ids;
pub mod personal_best;
pub mod race_time;
pub mod roster;

pub use personal_best::extract_personal_bests;
pub use race_time::parse_race_time;
pub use roster::{extract_detail_gender, extract_roster, extract_search_result, GenderSource};

use crate::error::ParseError;
use scraper::{ElementRef, Selector};

pub(crate) fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css.to_string()))
}

/// First descendant of `scope` matching `css`
pub(crate) fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Result<ElementRef<'a>, ParseError> {
    let sel = selector(css)?;
    scope
        .select(&sel)
        .next()
        .ok_or_else(|| ParseError::missing(css))
}

/// Required attribute; `element` names the element in the error
pub(crate) fn attr<'a>(
    element: ElementRef<'a>,
    described_as: &str,
    attribute: &'static str,
) -> Result<&'a str, ParseError> {
    element
        .value()
        .attr(attribute)
        .ok_or_else(|| ParseError::MissingAttribute {
            element: described_as.to_string(),
            attribute,
        })
}

/// Whitespace-trimmed text content
pub(crate) fn text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
