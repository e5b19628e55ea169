pub mod authorize;
pub mod flow;
pub mod pkce;
pub mod redirect;
pub mod token;

pub use authorize::build_authorize_url;
pub use flow::PendingAuthorization;
pub use pkce::{derive_challenge, generate_verifier, PkceChallenge};
pub use redirect::{parse_redirect_url, AuthorizationGrant};
pub use token::{
    ConfiguredRefresher, OAuthClient, RefreshOutcome, Rotation, TokenLifetime, TokenPair,
    TokenRefresher,
};
