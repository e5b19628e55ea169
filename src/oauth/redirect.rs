use url::form_urlencoded;

use crate::error::VkwallError;

/// Authorization code plus the device id VK ID binds it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationGrant {
    pub code: String,
    pub device_id: String,
}

/// Extract `code` and `device_id` from the address the browser ended up on.
///
/// VK ID puts the parameters either in the query string or in the
/// fragment, so both are searched (query first). Empty values count as
/// missing.
pub fn parse_redirect_url(input: &str) -> Result<AuthorizationGrant, VkwallError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(VkwallError::ParseError(
            "input is empty; paste the full address from the browser".to_string(),
        ));
    }

    let (before_fragment, fragment) = match input.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (input, None),
    };
    let query = before_fragment.split_once('?').map(|(_, q)| q);

    let lookup = |name: &str| {
        [query, fragment]
            .into_iter()
            .flatten()
            .find_map(|part| find_param(part, name))
    };

    let code = lookup("code").ok_or_else(|| missing_param("code"))?;
    let device_id = lookup("device_id").ok_or_else(|| missing_param("device_id"))?;

    Ok(AuthorizationGrant { code, device_id })
}

fn find_param(encoded: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(encoded.as_bytes())
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

fn missing_param(name: &str) -> VkwallError {
    VkwallError::ParseError(format!(
        "no '{name}' parameter found in the URL; copy the whole address bar and try again"
    ))
}
