pub const DEFAULT_REDIRECT_URI: &str = "https://oauth.vk.com/blank.html";
pub const DEFAULT_SCOPE: &str = "wall,photos,groups";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://id.vk.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://id.vk.com/oauth2/auth";
pub const DEFAULT_API_BASE_URL: &str = "https://api.vk.com/method";
pub const DEFAULT_API_VERSION: &str = "5.131";

/// VK ID application settings used by the interactive login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    /// Anti-forgery marker echoed back by the authorization server.
    pub state: String,
}

/// Application credentials sent along with a refresh-token grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub device_id: Option<String>,
}

/// Remote endpoints. Defaults point at production VK; tests point them at a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub api_base_url: String,
    pub api_version: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

/// Seed credentials supplied by the operator for a publish run.
#[derive(Clone, Default)]
pub struct Credentials {
    pub community_token: Option<String>,
    pub user_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("community_token", &self.community_token.as_ref().map(|_| "***"))
            .field("user_token", &self.user_token.as_ref().map(|_| "***"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .finish()
    }
}
