use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::traits::{BlobObject, BlobStore};
use crate::error::NotifierError;
use crate::token::TokenRecord;

const CONTENT_TYPE_JSON: &str = "application/json";

/// Keeps exactly one logical token under a key prefix.
///
/// `save` is a read-modify-write: list, delete everything under the prefix,
/// then write the new record. Concurrent saves may leave more than one object
/// behind; `latest` tolerates that by picking the newest upload.
#[derive(Clone)]
pub struct TokenRepository {
    store: Arc<dyn BlobStore>,
    prefix: String,
}

impl TokenRepository {
    pub fn new(store: Arc<dyn BlobStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn backend(&self) -> &str {
        self.store.name()
    }

    /// Replace whatever is stored under the prefix with `record`.
    pub async fn save(&self, record: &TokenRecord) -> Result<BlobObject, NotifierError> {
        let existing = self.store.list(&self.prefix).await?;
        self.delete_best_effort(&existing).await;

        let body = serde_json::to_vec(record)?;
        let pathname = format!("{}.json", self.prefix);
        let object = self.store.put(&pathname, body, CONTENT_TYPE_JSON).await?;

        info!(
            "Stored token {}... as {} (replaced {})",
            record.preview(),
            object.pathname,
            existing.len()
        );
        Ok(object)
    }

    /// The most recently uploaded record, if any.
    pub async fn latest(&self) -> Result<Option<TokenRecord>, NotifierError> {
        let mut objects = self.store.list(&self.prefix).await?;
        if objects.is_empty() {
            return Ok(None);
        }

        objects.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        let newest = &objects[0];
        debug!(
            "Reading {} ({} candidates under '{}')",
            newest.pathname,
            objects.len(),
            self.prefix
        );

        let content = self.store.get(&newest.url).await?;
        let record = serde_json::from_str(&content).map_err(|e| {
            NotifierError::Storage(format!("Stored token {} is not valid JSON: {e}", newest.pathname))
        })?;

        Ok(Some(record))
    }

    /// Delete every object concurrently. Failures are logged, never returned.
    async fn delete_best_effort(&self, objects: &[BlobObject]) {
        let deletions = objects.iter().map(|o| async move {
            let urls = [o.url.clone()];
            (o, self.store.delete(&urls).await)
        });

        for (object, result) in join_all(deletions).await {
            if let Err(e) = result {
                warn!("Failed to delete old token {}: {e}", object.pathname);
            }
        }
    }
}
