pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod store;
pub mod token;

pub use config::Config;
pub use error::NotifierError;

use std::sync::Arc;

/// Shared application state passed to all API handlers.
pub struct AppState {
    pub config: Config,
    pub repo: store::TokenRepository,
}

pub type SharedState = Arc<AppState>;

/// Build the blob store selected by `config`.
pub fn blob_store_from_config(
    config: &Config,
) -> Result<Arc<dyn store::BlobStore>, NotifierError> {
    match config.blob_backend {
        config::BlobBackend::Memory => Ok(Arc::new(store::MemoryBlobStore::new())),
        config::BlobBackend::Vercel => {
            let token = config.blob_token.clone().ok_or_else(|| {
                NotifierError::Internal("BLOB_READ_WRITE_TOKEN not configured".into())
            })?;
            Ok(Arc::new(store::VercelBlobStore::new(
                &config.blob_api_url,
                token,
                std::time::Duration::from_secs(config.blob_timeout_secs),
            )?))
        }
    }
}
