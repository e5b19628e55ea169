use std::path::Path;

use crate::config::Settings;
use crate::error::VkwallError;
use crate::oauth::{ConfiguredRefresher, OAuthClient, TokenRefresher};
use crate::publisher::{PublishRequest, Publisher};
use crate::session::Session;
use crate::wall::ImageSource;

use super::output::{print_publish_outcome, print_rotation_banner};

#[derive(Debug, Clone)]
pub struct PostOptions {
    pub message: Option<String>,
    pub message_file: Option<std::path::PathBuf>,
    pub images: Vec<ImageSource>,
    pub edit: Option<i64>,
    pub json: bool,
}

/// Resolve the post text from exactly one of `--message` / `--message-file`.
pub fn read_message(message: Option<&str>, message_file: Option<&Path>) -> Result<String, VkwallError> {
    let text = match (message, message_file) {
        (Some(_), Some(_)) => {
            return Err(VkwallError::config(
                "--message",
                "use either --message or --message-file, not both",
            ))
        }
        (None, None) => {
            return Err(VkwallError::config(
                "--message",
                "post text is required (--message or --message-file)",
            ))
        }
        (Some(text), None) => text.to_string(),
        (None, Some(path)) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VkwallError::NotFoundError {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(VkwallError::IoError(e)),
        },
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(VkwallError::config("--message", "post text is empty"));
    }
    Ok(text.to_string())
}

/// Publish (or edit) one post and print the result.
pub async fn run_post(settings: &Settings, opts: PostOptions) -> Result<(), VkwallError> {
    let message = read_message(opts.message.as_deref(), opts.message_file.as_deref())?;
    let group = settings.group_id()?;
    let endpoints = settings.endpoints();

    let refresher = match settings.client_credentials() {
        Some(creds) => Some(ConfiguredRefresher::new(
            OAuthClient::new(endpoints.token_url.as_str())?,
            creds,
        )),
        None => None,
    };
    let mut session = Session::new(
        settings.credentials(),
        refresher.as_ref().map(|r| r as &dyn TokenRefresher),
    );

    let publisher = Publisher::new(&endpoints, group)?;
    let request = PublishRequest {
        message,
        images: opts.images,
        edit: opts.edit,
    };

    let result = publisher.publish(&mut session, &request).await;

    let rotated = session.rotated_refresh_token();
    if let Some(token) = rotated {
        print_rotation_banner(token);
    }

    let outcome = result?;
    print_publish_outcome(&outcome, rotated, opts.json);
    Ok(())
}
