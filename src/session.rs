//! Per-run token state and the policy that picks which token a publish uses.
//!
//! A [`Session`] is built from the operator's seed credentials at the start of
//! a run and threaded through the publish steps. It lazily runs the refresh
//! grant when a user token is needed and none is cached, and remembers a
//! rotated refresh token so the caller can surface it even if a later step
//! fails.

use crate::config::env::{VK_GROUP_TOKEN, VK_OAUTH_CLIENT_ID, VK_REFRESH_TOKEN, VK_USER_TOKEN};
use crate::config::Credentials;
use crate::error::VkwallError;
use crate::oauth::{Rotation, TokenRefresher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    NoToken,
    HaveCommunityToken,
    HaveUserToken,
    NeedRefresh,
}

/// What the run is about to do, as far as token choice is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishIntent {
    pub has_images: bool,
    pub editing: bool,
}

impl PublishIntent {
    /// Photo upload only accepts user tokens. Edits also go through the user
    /// token so an edit never depends on the community key's permissions.
    pub fn requires_user_token(&self) -> bool {
        self.has_images || self.editing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenDecision {
    UseCommunity,
    UseUser,
    Refresh,
}

/// Bearer credential chosen for this run.
#[derive(Clone, PartialEq, Eq)]
pub enum BearerToken {
    Community(String),
    User(String),
}

impl BearerToken {
    pub fn secret(&self) -> &str {
        match self {
            BearerToken::Community(t) | BearerToken::User(t) => t,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BearerToken::Community(_) => "community",
            BearerToken::User(_) => "user",
        }
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BearerToken::{}(***)", self.kind())
    }
}

/// Pure selection policy, evaluated once per run.
pub fn decide(creds: &Credentials, intent: PublishIntent) -> Result<TokenDecision, VkwallError> {
    let has_user = creds.user_token.is_some();
    let has_refresh = creds.refresh_token.is_some();

    if intent.requires_user_token() {
        return match (has_user, has_refresh) {
            (true, _) => Ok(TokenDecision::UseUser),
            (false, true) => Ok(TokenDecision::Refresh),
            (false, false) => Err(VkwallError::config(
                VK_REFRESH_TOKEN,
                format!(
                    "uploading images or editing needs a user token; set {VK_REFRESH_TOKEN} \
                     (run `vkwall auth`) or {VK_USER_TOKEN}"
                ),
            )),
        };
    }

    if creds.community_token.is_some() {
        Ok(TokenDecision::UseCommunity)
    } else if has_user {
        Ok(TokenDecision::UseUser)
    } else if has_refresh {
        Ok(TokenDecision::Refresh)
    } else {
        Err(VkwallError::config(
            VK_GROUP_TOKEN,
            format!("no credentials configured; set {VK_GROUP_TOKEN} or {VK_REFRESH_TOKEN}"),
        ))
    }
}

pub struct Session<'r> {
    community_token: Option<String>,
    user_token: Option<String>,
    refresh_token: Option<String>,
    rotation: Rotation,
    refresher: Option<&'r dyn TokenRefresher>,
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("rotation", &self.rotation)
            .field("can_refresh", &self.refresher.is_some())
            .finish()
    }
}

impl<'r> Session<'r> {
    /// `refresher` is `None` when no OAuth application is configured; a
    /// refresh is then a configuration error rather than a network call.
    pub fn new(creds: Credentials, refresher: Option<&'r dyn TokenRefresher>) -> Self {
        Self {
            community_token: creds.community_token,
            user_token: creds.user_token,
            refresh_token: creds.refresh_token,
            rotation: Rotation::Unchanged,
            refresher,
        }
    }

    pub fn state(&self) -> TokenState {
        if self.user_token.is_some() {
            TokenState::HaveUserToken
        } else if self.community_token.is_some() {
            TokenState::HaveCommunityToken
        } else if self.refresh_token.is_some() {
            TokenState::NeedRefresh
        } else {
            TokenState::NoToken
        }
    }

    fn credentials(&self) -> Credentials {
        Credentials {
            community_token: self.community_token.clone(),
            user_token: self.user_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }

    /// Pick (and if needed mint) the token for a publish with this intent.
    pub async fn acquire(&mut self, intent: PublishIntent) -> Result<BearerToken, VkwallError> {
        let decision = decide(&self.credentials(), intent)?;
        tracing::debug!("Token decision for {intent:?} in {:?}: {decision:?}", self.state());

        match decision {
            TokenDecision::UseCommunity => self
                .community_token
                .clone()
                .map(BearerToken::Community)
                .ok_or_else(|| VkwallError::config(VK_GROUP_TOKEN, "not set")),
            TokenDecision::UseUser => self
                .user_token
                .clone()
                .map(BearerToken::User)
                .ok_or_else(|| VkwallError::config(VK_USER_TOKEN, "not set")),
            TokenDecision::Refresh => self.refresh_user_token().await.map(BearerToken::User),
        }
    }

    async fn refresh_user_token(&mut self) -> Result<String, VkwallError> {
        let refresher = self.refresher.ok_or_else(|| {
            VkwallError::config(
                VK_OAUTH_CLIENT_ID,
                "required to exchange the refresh token for a user token",
            )
        })?;
        let current = self
            .refresh_token
            .clone()
            .ok_or_else(|| VkwallError::config(VK_REFRESH_TOKEN, "not set"))?;

        let outcome = refresher.refresh(&current).await?;
        tracing::info!("Obtained user access token via refresh grant");

        if let Some(new_token) = outcome.rotation.new_refresh_token() {
            self.refresh_token = Some(new_token.to_string());
        }
        if outcome.rotation != Rotation::Unchanged {
            self.rotation = outcome.rotation;
        }
        self.user_token = Some(outcome.tokens.access_token.clone());
        Ok(outcome.tokens.access_token)
    }

    /// The refresh token to keep using after this run, if the service rotated it.
    pub fn rotated_refresh_token(&self) -> Option<&str> {
        self.rotation.new_refresh_token()
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }
}
