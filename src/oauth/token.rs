use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, ClientCredentials};
use crate::error::VkwallError;
use crate::http::{self, request_error, truncate};
use crate::oauth::pkce::PkceChallenge;
use crate::oauth::redirect::AuthorizationGrant;

/// How long an access token stays valid. VK reports `expires_in: 0` for
/// tokens that never expire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenLifetime {
    NonExpiring,
    Seconds(u64),
}

impl TokenLifetime {
    pub fn from_expires_in(expires_in: u64) -> Self {
        if expires_in == 0 {
            TokenLifetime::NonExpiring
        } else {
            TokenLifetime::Seconds(expires_in)
        }
    }

    /// Absolute expiry, counted from `issued_at`.
    pub fn expires_at(
        &self,
        issued_at: chrono::DateTime<chrono::Utc>,
    ) -> Option<chrono::DateTime<chrono::Utc>> {
        match self {
            TokenLifetime::NonExpiring => None,
            TokenLifetime::Seconds(secs) => {
                Some(issued_at + chrono::Duration::seconds(i64::try_from(*secs).ok()?))
            }
        }
    }
}

#[derive(Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub lifetime: Option<TokenLifetime>,
    pub user_id: Option<i64>,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"***")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("lifetime", &self.lifetime)
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Raw token endpoint body: either a token set or an `error` object.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    user_id: Option<i64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenResponse {
    fn into_token_pair(self) -> Result<TokenPair, VkwallError> {
        if let Some(code) = self.error {
            return Err(VkwallError::RemoteAuthError {
                code,
                description: self.error_description,
            });
        }
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| VkwallError::RemoteAuthError {
                code: "missing_access_token".to_string(),
                description: Some("token endpoint response has no access_token".to_string()),
            })?;
        Ok(TokenPair {
            access_token,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            lifetime: self.expires_in.map(TokenLifetime::from_expires_in),
            user_id: self.user_id,
        })
    }
}

/// Whether a refresh grant handed back a different refresh token.
#[derive(Clone, PartialEq, Eq)]
pub enum Rotation {
    Unchanged,
    Rotated { previous: String, current: String },
}

impl Rotation {
    fn detect(sent: &str, returned: Option<&str>) -> Self {
        match returned {
            Some(current) if current != sent => Rotation::Rotated {
                previous: sent.to_string(),
                current: current.to_string(),
            },
            _ => Rotation::Unchanged,
        }
    }

    pub fn new_refresh_token(&self) -> Option<&str> {
        match self {
            Rotation::Rotated { current, .. } => Some(current),
            Rotation::Unchanged => None,
        }
    }
}

impl std::fmt::Debug for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rotation::Unchanged => f.write_str("Unchanged"),
            Rotation::Rotated { .. } => f.write_str("Rotated { .. }"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub tokens: TokenPair,
    pub rotation: Rotation,
}

/// Something that can trade a refresh token for a fresh user access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome, VkwallError>;
}

/// Client for the VK ID token endpoint.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    token_url: String,
}

impl OAuthClient {
    pub fn new(token_url: impl Into<String>) -> Result<Self, VkwallError> {
        Ok(Self {
            http: http::client(http::TOKEN_TIMEOUT)?,
            token_url: token_url.into(),
        })
    }

    /// Exchange an authorization code for tokens.
    ///
    /// Consumes the PKCE pair: whatever the outcome, the verifier is gone.
    pub async fn exchange_code(
        &self,
        app: &AppConfig,
        grant: &AuthorizationGrant,
        pkce: PkceChallenge,
    ) -> Result<TokenPair, VkwallError> {
        let code_verifier = pkce.into_verifier();
        let form = [
            ("grant_type", "authorization_code"),
            ("code", grant.code.as_str()),
            ("redirect_uri", app.redirect_uri.as_str()),
            ("client_id", app.client_id.as_str()),
            ("device_id", grant.device_id.as_str()),
            ("code_verifier", code_verifier.as_str()),
            ("state", app.state.as_str()),
        ];
        tracing::debug!("Exchanging authorization code at {}", self.token_url);
        self.post_grant(&form, "authorization code exchange").await
    }

    /// Trade a refresh token for a new access token.
    pub async fn refresh(
        &self,
        client: &ClientCredentials,
        refresh_tok: &str,
    ) -> Result<RefreshOutcome, VkwallError> {
        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_tok),
            ("client_id", client.client_id.as_str()),
        ];
        if let Some(secret) = client.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }
        if let Some(device_id) = client.device_id.as_deref() {
            form.push(("device_id", device_id));
        }

        tracing::debug!("Refreshing user token at {}", self.token_url);
        let tokens = self.post_grant(&form, "refresh token exchange").await?;
        let rotation = Rotation::detect(refresh_tok, tokens.refresh_token.as_deref());
        if matches!(rotation, Rotation::Rotated { .. }) {
            tracing::warn!("Token endpoint rotated the refresh token; the old one is now invalid");
        }
        Ok(RefreshOutcome { tokens, rotation })
    }

    async fn post_grant(
        &self,
        form: &[(&str, &str)],
        context: &str,
    ) -> Result<TokenPair, VkwallError> {
        let resp = self
            .http
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| request_error(context, e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| request_error(context, e))?;

        // VK ID reports grant errors as JSON, sometimes with a 4xx status.
        let parsed = serde_json::from_str::<TokenResponse>(&body);
        if let Ok(parsed) = parsed {
            if status.is_success() || parsed.error.is_some() {
                return parsed.into_token_pair();
            }
        }

        if !status.is_success() {
            return Err(VkwallError::transport(
                context,
                format!("HTTP {status}: {}", truncate(&body, 200)),
            ));
        }
        Err(VkwallError::unexpected(
            context,
            format!("body is not a token response: {}", truncate(&body, 200)),
        ))
    }
}

/// Refresh-grant client bound to the application's credentials.
#[derive(Debug, Clone)]
pub struct ConfiguredRefresher {
    client: OAuthClient,
    credentials: ClientCredentials,
}

impl ConfiguredRefresher {
    pub fn new(client: OAuthClient, credentials: ClientCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

#[async_trait]
impl TokenRefresher for ConfiguredRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome, VkwallError> {
        self.client.refresh(&self.credentials, refresh_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<TokenPair, VkwallError> {
        serde_json::from_str::<TokenResponse>(json)
            .unwrap()
            .into_token_pair()
    }

    #[test]
    fn full_token_response() {
        let pair = parse(
            r#"{"access_token":"X","refresh_token":"Y","expires_in":3600,"user_id":7,"token_type":"Bearer"}"#,
        )
        .unwrap();
        assert_eq!(pair.access_token, "X");
        assert_eq!(pair.refresh_token.as_deref(), Some("Y"));
        assert_eq!(pair.lifetime, Some(TokenLifetime::Seconds(3600)));
        assert_eq!(pair.user_id, Some(7));
    }

    #[test]
    fn zero_expiry_means_non_expiring() {
        let pair = parse(r#"{"access_token":"X","expires_in":0}"#).unwrap();
        assert_eq!(pair.lifetime, Some(TokenLifetime::NonExpiring));
        assert!(pair.refresh_token.is_none());
    }

    #[test]
    fn error_response_is_remote_auth_error() {
        let err = parse(r#"{"error":"invalid_grant","error_description":"Code is expired"}"#)
            .err()
            .unwrap();
        match err {
            VkwallError::RemoteAuthError { code, description } => {
                assert_eq!(code, "invalid_grant");
                assert_eq!(description.as_deref(), Some("Code is expired"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_access_token_is_remote_auth_error() {
        let err = parse(r#"{"refresh_token":"Y"}"#).err().unwrap();
        assert_eq!(err.code(), "remote_auth_error");
        assert!(err.to_string().contains("access_token"));
    }

    #[test]
    fn rotation_detection() {
        assert_eq!(Rotation::detect("old", None), Rotation::Unchanged);
        assert_eq!(Rotation::detect("old", Some("old")), Rotation::Unchanged);
        let rotated = Rotation::detect("old", Some("new"));
        assert_eq!(rotated.new_refresh_token(), Some("new"));
        assert_eq!(
            rotated,
            Rotation::Rotated {
                previous: "old".into(),
                current: "new".into()
            }
        );
    }

    #[test]
    fn lifetime_expiry() {
        let now = chrono::Utc::now();
        assert_eq!(TokenLifetime::NonExpiring.expires_at(now), None);
        assert_eq!(
            TokenLifetime::Seconds(60).expires_at(now),
            Some(now + chrono::Duration::seconds(60))
        );
    }

    #[test]
    fn debug_output_hides_tokens() {
        let pair = TokenPair {
            access_token: "vk2.a.secret-access".into(),
            refresh_token: Some("vk2.r.secret-refresh".into()),
            lifetime: None,
            user_id: None,
        };
        let printed = format!("{pair:?}");
        assert!(!printed.contains("secret"));
        let rotation = Rotation::detect("a-secret", Some("b-secret"));
        assert!(!format!("{rotation:?}").contains("secret"));
    }
}
