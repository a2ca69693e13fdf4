use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::traits::{BlobObject, BlobStore};
use crate::error::NotifierError;

const URL_BASE: &str = "memory://blob/";

#[derive(Default)]
struct Inner {
    objects: HashMap<String, (BlobObject, String)>,
    last_upload: Option<DateTime<Utc>>,
}

/// In-process blob store. Nothing survives a restart.
///
/// Suffixes are inserted before the extension the way Vercel does it, and
/// upload times are kept strictly increasing so "latest" is well defined.
#[derive(Default)]
pub struct MemoryBlobStore {
    inner: RwLock<Inner>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects currently held.
    pub async fn len(&self) -> usize {
        self.inner.read().await.objects.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn suffixed(pathname: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..12];
    match pathname.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{suffix}.{ext}"),
        _ => format!("{pathname}-{suffix}"),
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put(
        &self,
        pathname: &str,
        body: Vec<u8>,
        _content_type: &str,
    ) -> Result<BlobObject, NotifierError> {
        let content = String::from_utf8(body)
            .map_err(|e| NotifierError::Storage(format!("Non UTF-8 blob body: {e}")))?;

        let mut inner = self.inner.write().await;
        let mut uploaded_at = Utc::now();
        if let Some(last) = inner.last_upload {
            if uploaded_at <= last {
                uploaded_at = last + Duration::milliseconds(1);
            }
        }
        inner.last_upload = Some(uploaded_at);

        let pathname = suffixed(pathname);
        let object = BlobObject {
            url: format!("{URL_BASE}{pathname}"),
            pathname,
            size: content.len() as u64,
            uploaded_at,
        };
        inner
            .objects
            .insert(object.url.clone(), (object.clone(), content));

        Ok(object)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<BlobObject>, NotifierError> {
        let inner = self.inner.read().await;
        Ok(inner
            .objects
            .values()
            .filter(|(o, _)| o.pathname.starts_with(prefix))
            .map(|(o, _)| o.clone())
            .collect())
    }

    async fn get(&self, url: &str) -> Result<String, NotifierError> {
        let inner = self.inner.read().await;
        inner
            .objects
            .get(url)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| NotifierError::Storage(format!("Blob {url} not found")))
    }

    async fn delete(&self, urls: &[String]) -> Result<(), NotifierError> {
        let mut inner = self.inner.write().await;
        for url in urls {
            inner.objects.remove(url);
        }
        Ok(())
    }
}
