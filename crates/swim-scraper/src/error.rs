//! Error types for the scraper.
//!
//! Fetching and extraction each have their own error; the facade wraps both
//! into [`ScrapeError`] so callers handle a single family.

use reqwest::StatusCode;
use thiserror::Error;

/// Transport-level failure. Retryable by the caller.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: StatusCode },

    #[error("Request to {url} returned an empty body")]
    EmptyBody { url: String },
}

/// Expected page structure is absent or malformed.
///
/// Indicates upstream markup drift; retrying will not help.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing element: {0}")]
    MissingElement(String),

    #[error("Missing attribute `{attribute}` on {element}")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("Invalid {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Invalid selector `{0}`")]
    Selector(String),
}

impl ParseError {
    pub(crate) fn missing(element: impl Into<String>) -> Self {
        ParseError::MissingElement(element.into())
    }

    pub(crate) fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        ParseError::InvalidValue {
            field,
            value: value.into(),
        }
    }
}

/// Facade-level error returned by every scraper operation
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Valid response without a matching record
    #[error("No athlete found matching {0:?}")]
    NotFound(String),

    #[error("Invalid athlete name {0:?}, expected \"Last, First\"")]
    InvalidName(String),
}

impl ScrapeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScrapeError::NotFound(_))
    }

    /// Only transport failures are worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScrapeError::Fetch(_))
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let fetch: ScrapeError = FetchError::EmptyBody {
            url: "https://example.test".to_string(),
        }
        .into();
        assert!(fetch.is_retryable());
        assert!(!fetch.is_not_found());

        let parse: ScrapeError = ParseError::missing("table.athleteList").into();
        assert!(!parse.is_retryable());

        let not_found = ScrapeError::NotFound("Doe, John".to_string());
        assert!(not_found.is_not_found());
        assert!(!not_found.is_retryable());
    }

    #[test]
    fn test_messages_name_the_element() {
        let err = ParseError::MissingAttribute {
            element: "td.name a".to_string(),
            attribute: "href",
        };
        assert_eq!(err.to_string(), "Missing attribute `href` on td.name a");

        let wrapped: ScrapeError = ParseError::missing("td.date").into();
        assert_eq!(wrapped.to_string(), "Missing element: td.date");
    }
}
