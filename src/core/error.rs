//! Errors raised while fetching a rate table

use thiserror::Error;

/// Shown whenever the API answers with a non-success status.
pub const NO_RATES_MESSAGE: &str =
    "Brak kursów dla wybranej daty, weekend albo święta. Wybierz inną datę.";

/// Used when a failure carries no message of its own.
pub const FALLBACK_MESSAGE: &str = "Failed to fetch rates";

/// The display text of each variant is exactly what the user sees in the
/// error banner.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Non-success HTTP status. NBP answers 404 for weekends and holidays,
    /// but every status is treated the same way.
    #[error("{}", NO_RATES_MESSAGE)]
    NoRatesForDate { status: u16 },

    /// Transport or body decoding failure.
    #[error("{0}")]
    Request(String),

    /// The body decoded but the table breaks an invariant.
    #[error("Invalid rate table: {0}")]
    InvalidTable(String),
}

impl FetchError {
    pub fn request(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            FetchError::Request(FALLBACK_MESSAGE.to_string())
        } else {
            FetchError::Request(message)
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(FetchError::NoRatesForDate { status: 404 }.to_string(), NO_RATES_MESSAGE);
        assert_eq!(FetchError::NoRatesForDate { status: 500 }.to_string(), NO_RATES_MESSAGE);
        assert_eq!(FetchError::request("connection refused").to_string(), "connection refused");
        assert_eq!(FetchError::request("  ").to_string(), FALLBACK_MESSAGE);
    }
}
