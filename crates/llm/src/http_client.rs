//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients with a request
//! timeout.

use std::time::Duration;

use crate::types::{LlmError, LlmResult};

/// Build a `reqwest::Client` with the given per-request timeout.
///
/// A timeout of `0` leaves the client without one.
pub fn build_http_client(timeout_secs: u64) -> LlmResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }
    builder.build().map_err(|e| LlmError::Other {
        message: format!("failed to build HTTP client: {}", e),
    })
}
