use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;

use crate::error::VkwallError;
use crate::types::GroupId;

use super::loader::load_env_file;
use super::types::{
    AppConfig, ClientCredentials, Credentials, Endpoints, DEFAULT_REDIRECT_URI, DEFAULT_SCOPE,
};

pub const VK_OAUTH_CLIENT_ID: &str = "VK_OAUTH_CLIENT_ID";
pub const VK_OAUTH_CLIENT_SECRET: &str = "VK_OAUTH_CLIENT_SECRET";
pub const VK_OAUTH_SCOPE: &str = "VK_OAUTH_SCOPE";
pub const VK_OAUTH_REDIRECT_URI: &str = "VK_OAUTH_REDIRECT_URI";
pub const VK_OAUTH_STATE: &str = "VK_OAUTH_STATE";
pub const VK_OAUTH_AUTHORIZE_URL: &str = "VK_OAUTH_AUTHORIZE_URL";
pub const VK_OAUTH_TOKEN_URL: &str = "VK_OAUTH_TOKEN_URL";
pub const VK_DEVICE_ID: &str = "VK_DEVICE_ID";
pub const VK_GROUP_ID: &str = "VK_GROUP_ID";
pub const VK_GROUP_TOKEN: &str = "VK_GROUP_TOKEN";
pub const VK_USER_TOKEN: &str = "VK_USER_TOKEN";
pub const VK_REFRESH_TOKEN: &str = "VK_REFRESH_TOKEN";
pub const VK_API_BASE_URL: &str = "VK_API_BASE_URL";
pub const VK_API_VERSION: &str = "VK_API_VERSION";

/// Layered view over the operator's settings.
///
/// Process environment wins over values read from the env file. Empty
/// values are treated as unset.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    /// Merge env-file variables with process variables (process wins).
    pub fn from_sources<I>(file_vars: HashMap<String, String>, process_vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut values = file_vars;
        values.extend(process_vars);
        Self { values }
    }

    /// Read the env file (explicit path or optional `./.env`) and the process environment.
    pub fn load(env_file: Option<&Path>) -> Result<Self, VkwallError> {
        let file_vars = load_env_file(env_file)?;
        Ok(Self::from_sources(file_vars, unicode_vars(std::env::vars_os())))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn get_owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    pub fn require(&self, key: &str) -> Result<&str, VkwallError> {
        self.get(key)
            .ok_or_else(|| VkwallError::config(key, "not set (add it to the environment or .env)"))
    }

    /// Settings for the interactive login.
    ///
    /// A random anti-forgery state is generated when `VK_OAUTH_STATE` is unset.
    pub fn app_config(&self) -> Result<AppConfig, VkwallError> {
        Ok(AppConfig {
            client_id: self.require(VK_OAUTH_CLIENT_ID)?.to_string(),
            redirect_uri: self
                .get_owned(VK_OAUTH_REDIRECT_URI)
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            scope: self
                .get_owned(VK_OAUTH_SCOPE)
                .unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            state: self
                .get_owned(VK_OAUTH_STATE)
                .unwrap_or_else(|| format!("vkwall-{}", uuid::Uuid::new_v4().simple())),
        })
    }

    /// Application credentials for refresh grants, if a client id is configured.
    pub fn client_credentials(&self) -> Option<ClientCredentials> {
        Some(ClientCredentials {
            client_id: self.get_owned(VK_OAUTH_CLIENT_ID)?,
            client_secret: self.get_owned(VK_OAUTH_CLIENT_SECRET),
            device_id: self.get_owned(VK_DEVICE_ID),
        })
    }

    pub fn endpoints(&self) -> Endpoints {
        let defaults = Endpoints::default();
        Endpoints {
            authorize_url: self
                .get_owned(VK_OAUTH_AUTHORIZE_URL)
                .unwrap_or(defaults.authorize_url),
            token_url: self.get_owned(VK_OAUTH_TOKEN_URL).unwrap_or(defaults.token_url),
            api_base_url: self
                .get_owned(VK_API_BASE_URL)
                .unwrap_or(defaults.api_base_url),
            api_version: self.get_owned(VK_API_VERSION).unwrap_or(defaults.api_version),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            community_token: self.get_owned(VK_GROUP_TOKEN),
            user_token: self.get_owned(VK_USER_TOKEN),
            refresh_token: self.get_owned(VK_REFRESH_TOKEN),
        }
    }

    pub fn group_id(&self) -> Result<GroupId, VkwallError> {
        let raw = self.require(VK_GROUP_ID)?;
        raw.parse::<GroupId>().map_err(|_| {
            VkwallError::config(
                VK_GROUP_ID,
                format!("must be a positive integer without a minus sign, got {raw:?}"),
            )
        })
    }
}

/// Keep only variables whose name and value are valid Unicode; anything else
/// cannot be one of our settings.
fn unicode_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}
