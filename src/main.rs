use std::path::PathBuf;

use clap::{Parser, Subcommand};

use vkwall::cli::auth::AuthOptions;
use vkwall::cli::post::PostOptions;
use vkwall::oauth::pkce::DEFAULT_VERIFIER_LENGTH;
use vkwall::wall::ImageSource;

#[derive(Parser)]
#[command(name = "vkwall", version, about = "Log in to VK ID and publish to a community wall")]
struct Cli {
    /// Env file to read settings from (default: ./.env if present)
    #[arg(long, global = true, env = "VKWALL_ENV_FILE")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Obtain a user access token and refresh token via the PKCE login flow
    Auth {
        /// Redirect URL from the browser (prompted on stdin when omitted)
        #[arg(long)]
        redirect_url: Option<String>,

        /// Do not try to open the login page in a browser
        #[arg(long)]
        no_browser: bool,

        /// Length of the PKCE code verifier (43-128)
        #[arg(long, default_value_t = DEFAULT_VERIFIER_LENGTH)]
        verifier_length: usize,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Create a post on the community wall, or edit an existing one
    Post {
        /// Post text
        #[arg(short, long, conflicts_with = "message_file")]
        message: Option<String>,

        /// Read the post text from a UTF-8 file
        #[arg(short = 'f', long)]
        message_file: Option<PathBuf>,

        /// Image to attach: local path or http(s) URL (repeatable)
        #[arg(short, long = "image")]
        images: Vec<ImageSource>,

        /// Id of an existing post to edit instead of creating a new one
        #[arg(long)]
        edit: Option<i64>,

        /// JSON output
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    fn json(&self) -> bool {
        match self {
            Commands::Auth { json, .. } | Commands::Post { json, .. } => *json,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("VKWALL_LOG_LEVEL")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.command.json();

    let result = run(cli).await;
    if let Err(e) = result {
        vkwall::cli::output::print_error(&e, json);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), vkwall::VkwallError> {
    let settings = vkwall::Settings::load(cli.env_file.as_deref())?;

    match cli.command {
        Commands::Auth {
            redirect_url,
            no_browser,
            verifier_length,
            json,
        } => {
            vkwall::cli::auth::run_auth(
                &settings,
                AuthOptions {
                    redirect_url,
                    no_browser,
                    verifier_length,
                    json,
                },
            )
            .await
        }
        Commands::Post {
            message,
            message_file,
            images,
            edit,
            json,
        } => {
            vkwall::cli::post::run_post(
                &settings,
                PostOptions {
                    message,
                    message_file,
                    images,
                    edit,
                    json,
                },
            )
            .await
        }
    }
}
