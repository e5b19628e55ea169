use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::config::env::{VK_REFRESH_TOKEN, VK_USER_TOKEN};
use crate::error::VkwallError;
use crate::oauth::{AuthorizationGrant, TokenLifetime, TokenPair};
use crate::publisher::PublishOutcome;

pub fn stdout_is_tty() -> bool {
    std::io::stdout().is_terminal()
}

pub fn stderr_is_tty() -> bool {
    std::io::stderr().is_terminal()
}

fn label(text: &str, is_tty: bool) -> String {
    if is_tty {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

pub fn format_lifetime(lifetime: Option<TokenLifetime>, issued_at: DateTime<Utc>) -> String {
    match lifetime {
        None => "unknown".to_string(),
        Some(TokenLifetime::NonExpiring) => "non-expiring".to_string(),
        Some(l @ TokenLifetime::Seconds(secs)) => match l.expires_at(issued_at) {
            Some(at) => format!("{secs} s (until {})", at.to_rfc3339()),
            None => format!("{secs} s"),
        },
    }
}

/// Lines to paste into the env file after a successful login.
pub fn env_lines(tokens: &TokenPair) -> Vec<String> {
    let mut lines = vec![format!("{VK_USER_TOKEN}={}", tokens.access_token)];
    if let Some(refresh) = &tokens.refresh_token {
        lines.push(format!("{VK_REFRESH_TOKEN}={refresh}"));
    }
    lines
}

pub fn auth_json(
    grant: &AuthorizationGrant,
    tokens: &TokenPair,
    issued_at: DateTime<Utc>,
) -> serde_json::Value {
    let expires_at = tokens
        .lifetime
        .and_then(|l| l.expires_at(issued_at))
        .map(|at| at.to_rfc3339());
    serde_json::json!({
        "access_token": tokens.access_token,
        "refresh_token": tokens.refresh_token,
        "lifetime": tokens.lifetime,
        "expires_at": expires_at,
        "user_id": tokens.user_id,
        "device_id": grant.device_id,
    })
}

pub fn print_auth_result(
    grant: &AuthorizationGrant,
    tokens: &TokenPair,
    issued_at: DateTime<Utc>,
    json: bool,
) {
    if json {
        let value = auth_json(grant, tokens, issued_at);
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        return;
    }

    let is_tty = stdout_is_tty();
    println!("{}: {}", label("Access token", is_tty), tokens.access_token);
    match &tokens.refresh_token {
        Some(refresh) => println!("{}: {}", label("Refresh token", is_tty), refresh),
        None => println!("{}: (none returned)", label("Refresh token", is_tty)),
    }
    println!(
        "{}: {}",
        label("Lifetime", is_tty),
        format_lifetime(tokens.lifetime, issued_at)
    );
    if let Some(user_id) = tokens.user_id {
        println!("{}: {}", label("User id", is_tty), user_id);
    }
    println!("{}: {}", label("Device id", is_tty), grant.device_id);

    println!();
    println!("Add these lines to your .env file:");
    for line in env_lines(tokens) {
        println!("{line}");
    }
    println!();

    let warning = "Keep these tokens secret: anyone holding them can post on your behalf.";
    if is_tty {
        println!("{}", warning.yellow());
    } else {
        println!("{warning}");
    }
}

pub fn publish_json(outcome: &PublishOutcome, rotated: Option<&str>) -> serde_json::Value {
    let mut value = serde_json::to_value(outcome).unwrap_or_else(|_| serde_json::json!({}));
    if let (Some(obj), Some(token)) = (value.as_object_mut(), rotated) {
        obj.insert("rotated_refresh_token".into(), token.into());
    }
    value
}

pub fn print_publish_outcome(outcome: &PublishOutcome, rotated: Option<&str>, json: bool) {
    if json {
        let value = publish_json(outcome, rotated);
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        return;
    }

    let verb = if outcome.edited { "edited" } else { "created" };
    if stdout_is_tty() {
        println!("Post {} {}", verb.green(), outcome.url.underline());
    } else {
        println!("Post {verb} {}", outcome.url);
    }
    if !outcome.attachments.is_empty() {
        let list: Vec<&str> = outcome.attachments.iter().map(|a| a.as_str()).collect();
        println!("Attachments: {}", list.join(","));
    }
}

pub fn rotation_banner(new_refresh_token: &str) -> String {
    format!(
        "The refresh token was rotated; the old one no longer works.\n\
         Update your .env file:\n{VK_REFRESH_TOKEN}={new_refresh_token}"
    )
}

/// Goes to stderr so it is seen even when stdout is redirected or the run failed.
pub fn print_rotation_banner(new_refresh_token: &str) {
    let banner = rotation_banner(new_refresh_token);
    if stderr_is_tty() {
        eprintln!("{}", banner.yellow().bold());
    } else {
        eprintln!("{banner}");
    }
}

pub fn print_error(err: &VkwallError, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&err.to_json()).unwrap_or_default());
    } else if stderr_is_tty() {
        eprintln!("{}: {err}", "Error".red().bold());
    } else {
        eprintln!("Error: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WallAttachment;

    fn tokens(refresh: Option<&str>, lifetime: Option<TokenLifetime>) -> TokenPair {
        TokenPair {
            access_token: "vk1.a.access".into(),
            refresh_token: refresh.map(str::to_string),
            lifetime,
            user_id: Some(42),
        }
    }

    fn issued() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn lifetime_zero_reads_non_expiring() {
        assert_eq!(
            format_lifetime(Some(TokenLifetime::NonExpiring), issued()),
            "non-expiring"
        );
        assert_eq!(format_lifetime(None, issued()), "unknown");
    }

    #[test]
    fn lifetime_seconds_shows_expiry() {
        let text = format_lifetime(Some(TokenLifetime::Seconds(3600)), issued());
        assert_eq!(text, "3600 s (until 2024-01-01T01:00:00+00:00)");
    }

    #[test]
    fn env_lines_include_refresh_token_when_present() {
        assert_eq!(
            env_lines(&tokens(Some("vk1.r.refresh"), None)),
            vec!["VK_USER_TOKEN=vk1.a.access", "VK_REFRESH_TOKEN=vk1.r.refresh"]
        );
        assert_eq!(env_lines(&tokens(None, None)), vec!["VK_USER_TOKEN=vk1.a.access"]);
    }

    #[test]
    fn auth_json_fields() {
        let grant = AuthorizationGrant {
            code: "c".into(),
            device_id: "dev".into(),
        };
        let value = auth_json(
            &grant,
            &tokens(Some("r"), Some(TokenLifetime::NonExpiring)),
            issued(),
        );
        assert_eq!(value["access_token"], "vk1.a.access");
        assert_eq!(value["refresh_token"], "r");
        assert_eq!(value["lifetime"], "non_expiring");
        assert!(value["expires_at"].is_null());
        assert_eq!(value["device_id"], "dev");
        assert!(value.get("code").is_none());
    }

    #[test]
    fn publish_json_carries_rotation() {
        let outcome = PublishOutcome {
            post_id: 15,
            url: "https://vk.com/wall-777_15".into(),
            edited: false,
            attachments: vec![WallAttachment::photo(-777, 1)],
            token: "user",
        };
        let value = publish_json(&outcome, Some("rt-2"));
        assert_eq!(value["post_id"], 15);
        assert_eq!(value["attachments"][0], "photo-777_1");
        assert_eq!(value["rotated_refresh_token"], "rt-2");

        let value = publish_json(&outcome, None);
        assert!(value.get("rotated_refresh_token").is_none());
    }

    #[test]
    fn banner_names_the_setting() {
        let banner = rotation_banner("rt-new");
        assert!(banner.contains("VK_REFRESH_TOKEN=rt-new"));
    }
}
