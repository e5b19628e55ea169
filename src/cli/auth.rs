use std::io::{self, BufRead, Write};

use crate::config::Settings;
use crate::error::VkwallError;
use crate::oauth::{OAuthClient, PendingAuthorization};

use super::output::print_auth_result;

#[derive(Debug, Clone)]
pub struct AuthOptions {
    pub redirect_url: Option<String>,
    pub no_browser: bool,
    pub verifier_length: usize,
    pub json: bool,
}

/// Run the interactive PKCE login and print the resulting tokens.
pub async fn run_auth(settings: &Settings, opts: AuthOptions) -> Result<(), VkwallError> {
    let app = settings.app_config()?;
    let endpoints = settings.endpoints();
    let pending = PendingAuthorization::begin(&endpoints, app, opts.verifier_length)?;

    // Instructions go to stderr; stdout carries only the result.
    let app = pending.app();
    eprintln!("Client id:    {}", app.client_id);
    eprintln!("Redirect URI: {}", app.redirect_uri);
    eprintln!("Scope:        {}", app.scope);
    eprintln!();
    eprintln!("Open this URL, log in and allow access:");
    eprintln!("{}", pending.authorize_url());
    eprintln!();

    let input = match opts.redirect_url {
        Some(url) => url,
        None => {
            if !opts.no_browser && pending.open_in_browser() {
                eprintln!("(opened in your browser)");
            }
            let stdin = io::stdin();
            let mut reader = stdin.lock();
            prompt(
                &mut reader,
                "Paste the full address you were redirected to: ",
            )?
        }
    };

    let client = OAuthClient::new(endpoints.token_url.as_str())?;
    let issued_at = chrono::Utc::now();
    let (grant, tokens) = pending.complete(&client, &input).await?;
    tracing::info!("Login complete");

    print_auth_result(&grant, &tokens, issued_at, opts.json);
    Ok(())
}

fn prompt(reader: &mut impl BufRead, message: &str) -> Result<String, VkwallError> {
    eprint!("{message}");
    io::stderr().flush()?;
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let line = line.trim();
    if line.is_empty() {
        return Err(VkwallError::ParseError("no redirect URL entered".into()));
    }
    Ok(line.to_string())
}
