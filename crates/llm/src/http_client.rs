//! HTTP Client Factory
//!
//! Builds the reqwest client shared by a provider's requests.

use std::time::Duration;

use crate::types::LlmError;

/// Build a `reqwest::Client` whose requests time out after `timeout`.
///
/// Proxy settings come from the standard environment variables, as reqwest
/// does by default.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(|e| LlmError::ProviderUnavailable {
            message: format!("failed to build HTTP client: {}", e),
        })
}
