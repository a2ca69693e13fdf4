use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use token_notifier::{api, blob_store_from_config, store::TokenRepository, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_notifier=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!("token-notifier v{}", env!("CARGO_PKG_VERSION"));
    info!("Listening on {}", config.bind_addr());

    let store = blob_store_from_config(&config)?;
    info!(
        "Blob backend: {} (prefix '{}')",
        store.name(),
        config.key_prefix
    );
    let repo = TokenRepository::new(store, config.key_prefix.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        repo,
    });

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Server ready ✓");
    axum::serve(listener, app).await?;

    Ok(())
}
