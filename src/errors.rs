//! Error taxonomy for the scraping pipelines.
//!
//! Every failure a pipeline can hit falls into one of two buckets:
//! the data never arrived ([`ErrorKind::Transport`]) or it arrived in a
//! shape we could not read ([`ErrorKind::Parse`]). Pipelines never surface
//! either to the caller; they log the kind and substitute fallback data.

use std::time::Duration;

use thirtyfour::error::WebDriverError;
use thiserror::Error;

/// Coarse classification used for logging and fallback decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, browser launch, navigation, or timeout failures.
    Transport,
    /// Malformed content or missing fields.
    Parse,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("browser automation failed: {0}")]
    Browser(#[from] WebDriverError),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            // reqwest reports body decoding failures through the same type
            ScrapeError::Http(e) if e.is_decode() => ErrorKind::Parse,
            ScrapeError::Http(_)
            | ScrapeError::Browser(_)
            | ScrapeError::Timeout(_)
            | ScrapeError::Url(_) => ErrorKind::Transport,
            ScrapeError::Json(_) => ErrorKind::Parse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_transport() {
        let err = ScrapeError::Timeout(Duration::from_secs(30));
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "timed out after 30s");
    }

    #[test]
    fn test_json_error_is_parse() {
        let e = serde_json::from_str::<serde_json::Value>("{\"results\": [").unwrap_err();
        let err = ScrapeError::from(e);
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().starts_with("malformed JSON payload"));
    }
}
