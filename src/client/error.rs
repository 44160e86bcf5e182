//! Error types for client operations.
//!
//! Variants carry the request URL so a failure deep in a pagination loop
//! still names the page that broke.

use thiserror::Error;

use crate::extract::ExtractError;
use crate::ocr::OcrError;

/// Errors that can occur while talking to the problem bank.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP client construction failed.
    #[error("HTTP client construction failed: {source}")]
    Build {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// The configured base URL does not parse.
    #[error("invalid base URL: {url}")]
    InvalidBaseUrl {
        /// The base URL string.
        url: String,
    },

    /// Network-level error (DNS, connection refused, TLS, timeout).
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response (4xx/5xx).
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The fetched page did not have the structure extraction expects.
    #[error("extraction failed for {url}: {source}")]
    Extract {
        /// The page that failed extraction.
        url: String,
        /// The underlying extraction error.
        #[source]
        source: ExtractError,
    },

    /// A generate endpoint answered without the expected redirect.
    #[error("no Location header in response from {url}")]
    MissingLocation {
        /// The generate URL that was requested.
        url: String,
    },

    /// A redirect Location did not contain a parseable id.
    #[error("no id found in Location '{location}' from {url}")]
    InvalidLocation {
        /// The generate URL that was requested.
        url: String,
        /// The Location header value.
        location: String,
    },

    /// Formula OCR failed for a problem fetch.
    #[error("OCR failed for {url}: {source}")]
    Ocr {
        /// The problem page being recognized.
        url: String,
        /// The underlying OCR error.
        #[source]
        source: OcrError,
    },
}

// No blanket From impls: every variant needs the request URL for context,
// which the source errors don't carry. Helper constructors do instead.
impl ClientError {
    /// Creates a build error from a reqwest builder error.
    pub fn build(source: reqwest::Error) -> Self {
        Self::Build { source }
    }

    /// Creates an invalid-base-URL error.
    pub fn invalid_base_url(url: impl Into<String>) -> Self {
        Self::InvalidBaseUrl { url: url.into() }
    }

    /// Creates a network error for the given URL.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an extraction error for the given page.
    pub fn extract(url: impl Into<String>, source: ExtractError) -> Self {
        Self::Extract {
            url: url.into(),
            source,
        }
    }

    /// Creates a missing-Location error.
    pub fn missing_location(url: impl Into<String>) -> Self {
        Self::MissingLocation { url: url.into() }
    }

    /// Creates an invalid-Location error.
    pub fn invalid_location(url: impl Into<String>, location: impl Into<String>) -> Self {
        Self::InvalidLocation {
            url: url.into(),
            location: location.into(),
        }
    }

    /// Creates an OCR error for the given problem page.
    pub fn ocr(url: impl Into<String>, source: OcrError) -> Self {
        Self::Ocr {
            url: url.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let error = ClientError::http_status("https://math-ege.sdamgia.ru/problem?id=1", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "got: {msg}");
        assert!(msg.contains("problem?id=1"), "got: {msg}");
    }

    #[test]
    fn test_extract_display_carries_url_and_selector() {
        let error = ClientError::extract(
            "https://math-ege.sdamgia.ru/problem?id=1",
            ExtractError::missing_node("div.prob_maindiv"),
        );
        let msg = error.to_string();
        assert!(msg.contains("problem?id=1"), "got: {msg}");
        assert!(
            std::error::Error::source(&error).is_some(),
            "source must be preserved"
        );
    }

    #[test]
    fn test_invalid_location_display() {
        let error = ClientError::invalid_location("https://x/test?a=generate", "/test");
        let msg = error.to_string();
        assert!(msg.contains("/test"), "got: {msg}");
    }
}
