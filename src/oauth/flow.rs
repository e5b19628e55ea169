use crate::config::{AppConfig, Endpoints};
use crate::error::VkwallError;
use crate::oauth::authorize::build_authorize_url;
use crate::oauth::pkce::PkceChallenge;
use crate::oauth::redirect::{parse_redirect_url, AuthorizationGrant};
use crate::oauth::token::{OAuthClient, TokenPair};

/// An authorization attempt waiting for the operator to come back with the redirect URL.
///
/// Owns the PKCE pair for this attempt; completing it (successfully or not)
/// consumes the attempt, so a verifier is never reused.
#[derive(Debug)]
pub struct PendingAuthorization {
    app: AppConfig,
    pkce: PkceChallenge,
    authorize_url: String,
}

impl PendingAuthorization {
    /// Start a new attempt with a fresh verifier of `verifier_length` characters.
    pub fn begin(
        endpoints: &Endpoints,
        app: AppConfig,
        verifier_length: usize,
    ) -> Result<Self, VkwallError> {
        let pkce = PkceChallenge::with_length(verifier_length)?;
        let authorize_url = build_authorize_url(&endpoints.authorize_url, &app, pkce.challenge())?;
        Ok(Self {
            app,
            pkce,
            authorize_url,
        })
    }

    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Try to open the login page in the default browser.
    ///
    /// Returns `false` when no browser could be launched; the caller should
    /// then show the URL for manual copying.
    pub fn open_in_browser(&self) -> bool {
        match webbrowser::open(&self.authorize_url) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Could not open browser automatically: {e}");
                false
            }
        }
    }

    /// Parse the pasted redirect URL and exchange the code for tokens.
    pub async fn complete(
        self,
        client: &OAuthClient,
        redirect_input: &str,
    ) -> Result<(AuthorizationGrant, TokenPair), VkwallError> {
        let grant = parse_redirect_url(redirect_input)?;
        tracing::info!("Found authorization code for device {}", grant.device_id);
        let tokens = client.exchange_code(&self.app, &grant, self.pkce).await?;
        Ok((grant, tokens))
    }
}
