pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod publisher;
pub mod session;
pub mod types;
pub mod wall;

pub use config::{AppConfig, ClientCredentials, Credentials, Endpoints, Settings};
pub use error::VkwallError;
pub use oauth::{OAuthClient, PendingAuthorization, PkceChallenge, TokenPair, TokenRefresher};
pub use publisher::{PublishOutcome, PublishRequest, Publisher};
pub use session::{BearerToken, PublishIntent, Session, TokenDecision};
pub use types::{GroupId, WallAttachment, WallPost};
