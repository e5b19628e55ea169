use url::Url;

use crate::config::AppConfig;
use crate::error::VkwallError;
use crate::oauth::pkce::CHALLENGE_METHOD;

/// Build the browser login URL for the PKCE authorization-code flow.
///
/// Pure: identical inputs always give a byte-identical URL, with the query
/// parameters in a fixed order.
pub fn build_authorize_url(
    authorize_endpoint: &str,
    app: &AppConfig,
    code_challenge: &str,
) -> Result<String, VkwallError> {
    let mut url = Url::parse(authorize_endpoint).map_err(|e| {
        VkwallError::config(
            "authorize endpoint",
            format!("invalid URL '{authorize_endpoint}': {e}"),
        )
    })?;

    url.query_pairs_mut()
        .clear()
        .append_pair("response_type", "code")
        .append_pair("client_id", &app.client_id)
        .append_pair("scope", &app.scope)
        .append_pair("redirect_uri", &app.redirect_uri)
        .append_pair("state", &app.state)
        .append_pair("code_challenge", code_challenge)
        .append_pair("code_challenge_method", CHALLENGE_METHOD);

    Ok(url.into())
}
