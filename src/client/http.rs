//! Shared HTTP client construction policy.
//!
//! Centralizes networking defaults (timeouts, user-agent, compression,
//! redirect handling) so every client instance behaves the same. Redirects
//! are never followed: the generate endpoints answer with a `Location`
//! header the client must observe, and ordinary page fetches don't
//! redirect on the live site.

use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;

use super::ClientError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/dinaprk/sdamgia-api";

/// Default User-Agent for all requests (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("sdamgia/{version} (problem-bank-client; +{PROJECT_UA_URL})")
}

/// Builds the shared HTTP client using project policy.
///
/// # Errors
///
/// Returns [`ClientError::Build`] when client construction fails.
pub(crate) fn build_http_client() -> Result<Client, ClientError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .user_agent(default_user_agent())
        .gzip(true)
        .redirect(Policy::none())
        .build()
        .map_err(ClientError::build)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_format() {
        let ua = default_user_agent();
        assert!(ua.starts_with("sdamgia/"), "UA must identify the crate: {ua}");
        assert!(
            ua.contains(env!("CARGO_PKG_VERSION")),
            "UA must contain crate version: {ua}"
        );
        assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL: {ua}");
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client().is_ok());
    }
}
