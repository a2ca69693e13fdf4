//! token-sync: copy the current access token from the notifier into a dotenv file.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

use token_notifier::client::{env_file, FetchOutcome, NotifierClient};

#[derive(Debug, Parser)]
#[command(version, about = "Fetch the stored access token and write it into a .env file")]
struct Args {
    /// Notifier endpoint serving GET requests.
    #[arg(long, env = "NOTIFIER_ENDPOINT")]
    endpoint: String,

    /// Dotenv file to update.
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Variable the token is written to.
    #[arg(long, default_value = "A_TOKEN")]
    key: String,
}

fn preview(token: &str) -> String {
    token.chars().take(20).collect()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_sync=info".into()),
        )
        .init();

    if let Err(e) = run(Args::parse()).await {
        error!("{e:#}");
        std::process::exit(1);
    }
    info!("Token updated and verified");
}

async fn run(args: Args) -> Result<()> {
    info!("Fetching access token from {}", args.endpoint);
    let client = NotifierClient::new(&args.endpoint)?;

    let token = match client.fetch_token().await? {
        FetchOutcome::Valid(token) => token,
        FetchOutcome::Invalid => bail!("Token is not valid or expired"),
        FetchOutcome::NotFound => bail!("No token found in storage; run the token request first"),
        FetchOutcome::Expired => bail!("Token has expired; generate a new one"),
        FetchOutcome::Unexpected { status, body } => {
            bail!("Unexpected response {status}: {body}")
        }
    };

    info!(
        "Token {}... retrieved (expires in {} hours, stored at {})",
        preview(&token.access_token),
        token
            .expires_in_hours
            .map(|h| h.to_string())
            .unwrap_or_else(|| "unknown".into()),
        token.stored_at.as_deref().unwrap_or("unknown"),
    );

    env_file::upsert(&args.env_file, &args.key, &token.access_token)?;
    info!("{} updated", args.env_file.display());

    match env_file::read(&args.env_file, &args.key)? {
        Some(v) if v == token.access_token => Ok(()),
        Some(_) => {
            warn!("{} holds a different value than the one written", args.key);
            bail!("Verification of {} failed", args.key)
        }
        None => bail!("{} not found in {}", args.key, args.env_file.display()),
    }
}
