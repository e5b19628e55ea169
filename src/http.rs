use std::time::Duration;

use crate::error::VkwallError;

/// API method calls (`wall.*`, `photos.*`).
pub const API_TIMEOUT: Duration = Duration::from_secs(15);
/// Token endpoint grants.
pub const TOKEN_TIMEOUT: Duration = Duration::from_secs(30);
/// Downloading remote images before upload.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
/// Binary photo uploads.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client whose every request is bounded by `timeout`.
pub fn client(timeout: Duration) -> Result<reqwest::Client, VkwallError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| VkwallError::transport("building HTTP client", e))
}

/// Map a send/receive failure, naming timeouts explicitly.
pub(crate) fn request_error(context: &str, err: reqwest::Error) -> VkwallError {
    if err.is_timeout() {
        VkwallError::transport(context, format!("request timed out: {err}"))
    } else {
        VkwallError::transport(context, err)
    }
}

/// Cut a response body down for error messages.
pub(crate) fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
