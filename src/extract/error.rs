//! Error type for HTML extraction.

use thiserror::Error;

/// Errors raised while pulling structured data out of a fetched page.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A node the page structure requires was not found.
    #[error("expected node not found: {selector}")]
    MissingNode {
        /// The CSS selector that matched nothing.
        selector: String,
    },
}

impl ExtractError {
    /// Creates a missing-node error for the given selector.
    pub fn missing_node(selector: impl Into<String>) -> Self {
        Self::MissingNode {
            selector: selector.into(),
        }
    }
}
