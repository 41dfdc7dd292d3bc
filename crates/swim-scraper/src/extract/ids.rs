//! Numeric ids recovered from anchor `href` values.
//!
//! The site exposes ids only inside relative links, at fixed character
//! offsets. Each id kind has exactly one helper here, so a change to the
//! upstream URL format is a one-place fix.

use crate::error::ParseError;

struct IdSlice {
    field: &'static str,
    /// Byte offset where the id starts
    start: usize,
    /// Fixed width, or `None` to read the run of digits at `start`
    width: Option<usize>,
}

/// `?page=athleteDetail&athleteId=1234567`
const ATHLETE: IdSlice = IdSlice {
    field: "athlete id",
    start: 30,
    width: Some(7),
};

/// `?page=athleteDetail&athleteId=1234567&styleId=13`
const STYLE: IdSlice = IdSlice {
    field: "style id",
    start: 46,
    width: None,
};

/// `?page=athleteDetail&athleteId=1234567&resultId=98765432`
const RESULT: IdSlice = IdSlice {
    field: "result id",
    start: 47,
    width: None,
};

/// `?page=meetDetail&meetId=612345&clubId=73626`
const MEET: IdSlice = IdSlice {
    field: "meet id",
    start: 24,
    width: None,
};

fn slice_id(href: &str, slice: &IdSlice) -> Result<u64, ParseError> {
    let invalid = || ParseError::invalid(slice.field, href);

    let rest = href.get(slice.start..).ok_or_else(invalid)?;
    let digits = match slice.width {
        Some(width) => rest.get(..width).ok_or_else(invalid)?,
        None => {
            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            &rest[..end]
        }
    };

    digits.parse().map_err(|_| invalid())
}

fn slice_u32(href: &str, slice: &IdSlice) -> Result<u32, ParseError> {
    let id = slice_id(href, slice)?;
    u32::try_from(id).map_err(|_| ParseError::invalid(slice.field, href))
}

pub fn athlete_id(href: &str) -> Result<u32, ParseError> {
    slice_u32(href, &ATHLETE)
}

pub fn style_id(href: &str) -> Result<u32, ParseError> {
    slice_u32(href, &STYLE)
}

pub fn result_id(href: &str) -> Result<u64, ParseError> {
    slice_id(href, &RESULT)
}

pub fn meet_id(href: &str) -> Result<u32, ParseError> {
    slice_u32(href, &MEET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_athlete_id() {
        assert_eq!(athlete_id("?page=athleteDetail&athleteId=1234567"), Ok(1234567));
        // Trailing parameters do not matter for the fixed-width slice
        assert_eq!(
            athlete_id("?page=athleteDetail&athleteId=7654321&pbest=1"),
            Ok(7654321)
        );
    }

    #[test]
    fn test_short_href_is_invalid() {
        assert_eq!(
            athlete_id("?page=athleteDetail&athleteId=12"),
            Err(ParseError::InvalidValue {
                field: "athlete id",
                value: "?page=athleteDetail&athleteId=12".to_string(),
            })
        );
        assert!(athlete_id("").is_err());
    }

    #[test]
    fn test_non_numeric_slice_is_invalid() {
        assert!(athlete_id("?page=athleteDetail&athleteName=ABCDEFG").is_err());
    }

    #[test]
    fn test_style_result_and_meet_ids() {
        assert_eq!(
            style_id("?page=athleteDetail&athleteId=1234567&styleId=13"),
            Ok(13)
        );
        assert_eq!(
            result_id("?page=athleteDetail&athleteId=1234567&resultId=98765432"),
            Ok(98765432)
        );
        assert_eq!(meet_id("?page=meetDetail&meetId=612345&clubId=73626"), Ok(612345));
    }

    #[test]
    fn test_digit_run_must_not_be_empty() {
        assert!(meet_id("?page=meetDetail&meetId=&clubId=73626").is_err());
    }
}
