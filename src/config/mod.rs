pub mod env;
pub mod loader;
pub mod types;

pub use env::Settings;
pub use loader::load_env_file;
pub use types::{AppConfig, ClientCredentials, Credentials, Endpoints};
