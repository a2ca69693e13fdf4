use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::NotifierError;

/// Metadata of one object held by a blob store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobObject {
    pub url: String,
    pub pathname: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Operations the token repository needs from an object store.
///
/// Writes never overwrite: every `put` lands under a fresh, suffixed key, so
/// replacing a value means listing the old keys and deleting them.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Short backend name for logs (e.g. "vercel", "memory").
    fn name(&self) -> &str;

    /// Store `body` under `pathname` plus a random suffix.
    async fn put(
        &self,
        pathname: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<BlobObject, NotifierError>;

    /// Every object whose pathname starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<BlobObject>, NotifierError>;

    /// Fetch the content of the object at `url`.
    async fn get(&self, url: &str) -> Result<String, NotifierError>;

    /// Delete the objects at `urls`. Unknown URLs are not an error.
    async fn delete(&self, urls: &[String]) -> Result<(), NotifierError>;
}
