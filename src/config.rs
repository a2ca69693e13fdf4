use anyhow::{bail, Context, Result};

/// Which object store backs the token repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobBackend {
    Vercel,
    /// In-process store, lost on restart. Local development only.
    Memory,
}

/// Application configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // ── Server ──────────────────────────────────────────────────────────
    pub host: String,
    pub port: u16,

    // ── Blob storage ────────────────────────────────────────────────────
    pub blob_backend: BlobBackend,
    /// Read/write token issued by Vercel for the blob store.
    pub blob_token: Option<String>,
    pub blob_api_url: String,
    pub blob_timeout_secs: u64,

    /// Pathname prefix shared by every stored copy of the token.
    pub key_prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let blob_backend = match std::env::var("BLOB_BACKEND")
            .unwrap_or_else(|_| "vercel".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "vercel" => BlobBackend::Vercel,
            "memory" => BlobBackend::Memory,
            other => bail!("Invalid BLOB_BACKEND '{other}' (expected 'vercel' or 'memory')"),
        };

        let blob_token = std::env::var("BLOB_READ_WRITE_TOKEN").ok();
        if blob_backend == BlobBackend::Vercel && blob_token.is_none() {
            bail!("BLOB_READ_WRITE_TOKEN is required when BLOB_BACKEND=vercel");
        }

        Ok(Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".into())
                .parse()
                .context("Invalid PORT")?,

            blob_backend,
            blob_token,
            blob_api_url: std::env::var("BLOB_API_URL")
                .unwrap_or_else(|_| "https://blob.vercel-storage.com".into()),
            blob_timeout_secs: std::env::var("BLOB_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .context("Invalid BLOB_TIMEOUT_SECS")?,

            key_prefix: std::env::var("TOKEN_KEY_PREFIX")
                .unwrap_or_else(|_| "upstox-token".into()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
