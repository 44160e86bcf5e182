//! Error type for formula OCR.

use thiserror::Error;

/// Errors from formula image fetching or recognition.
#[derive(Debug, Error)]
pub enum OcrError {
    /// Network-level error fetching a formula image.
    #[error("network error fetching formula image {url}: {source}")]
    Fetch {
        /// The image URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response fetching a formula image.
    #[error("HTTP {status} fetching formula image {url}")]
    HttpStatus {
        /// The image URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The recognizer itself failed.
    #[error("recognition failed: {message}")]
    Model {
        /// Implementation-provided failure description.
        message: String,
    },
}

impl OcrError {
    /// Creates a fetch error for the given image URL.
    pub fn fetch(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error for the given image URL.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Wraps a recognizer-specific failure. Intended for [`LatexOcr`]
    /// implementations outside this crate.
    ///
    /// [`LatexOcr`]: crate::ocr::LatexOcr
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
        }
    }
}
