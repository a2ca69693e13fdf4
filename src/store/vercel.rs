use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use super::traits::{BlobObject, BlobStore};
use crate::error::NotifierError;

const BLOB_API_VERSION: &str = "7";
const LIST_PAGE_LIMIT: &str = "1000";

/// Vercel Blob REST client.
///
/// Quirks:
/// - Every request carries `x-api-version` next to the bearer token.
/// - `put` with `x-add-random-suffix: 1` returns the final URL; the suffix is
///   chosen by Vercel.
/// - `list` is paginated with an opaque cursor and `hasMore`.
/// - Delete is a POST to `/delete` with a JSON list of URLs.
/// - Content is read from the public object URL, not the API host.
pub struct VercelBlobStore {
    api_url: String,
    token: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PutBlobResponse {
    url: String,
    pathname: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListBlobItem {
    url: String,
    pathname: String,
    #[serde(default)]
    size: u64,
    uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListBlobResponse {
    blobs: Vec<ListBlobItem>,
    cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

impl VercelBlobStore {
    pub fn new(api_url: &str, token: String, timeout: Duration) -> Result<Self, NotifierError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifierError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, NotifierError> {
        url::Url::parse(&format!("{}/{}", self.api_url, path))
            .map_err(|e| NotifierError::Internal(format!("Invalid BLOB_API_URL: {e}")))
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.bearer_auth(&self.token)
            .header("x-api-version", BLOB_API_VERSION)
    }
}

/// Turn a non-2xx response into a storage error carrying status and body.
async fn check(resp: reqwest::Response, op: &str) -> Result<reqwest::Response, NotifierError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(NotifierError::Storage(format!(
        "Vercel blob {op} failed ({status}): {body}"
    )))
}

#[async_trait]
impl BlobStore for VercelBlobStore {
    fn name(&self) -> &str {
        "vercel"
    }

    async fn put(
        &self,
        pathname: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<BlobObject, NotifierError> {
        let mut endpoint = self.endpoint("")?;
        endpoint.query_pairs_mut().append_pair("pathname", pathname);

        let size = body.len() as u64;
        let resp = self
            .authorized(self.http.put(endpoint))
            .header("x-add-random-suffix", "1")
            .header("x-content-type", content_type)
            .body(body)
            .send()
            .await?;

        let put: PutBlobResponse = check(resp, "put")
            .await?
            .json()
            .await
            .map_err(|e| NotifierError::Storage(format!("Failed to parse put response: {e}")))?;

        Ok(BlobObject {
            url: put.url,
            pathname: put.pathname,
            size,
            uploaded_at: Utc::now(),
        })
    }

    async fn list(&self, prefix: &str) -> Result<Vec<BlobObject>, NotifierError> {
        let mut objects = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut endpoint = self.endpoint("")?;
            {
                let mut query = endpoint.query_pairs_mut();
                query
                    .append_pair("prefix", prefix)
                    .append_pair("limit", LIST_PAGE_LIMIT);
                if let Some(c) = &cursor {
                    query.append_pair("cursor", c);
                }
            }

            let resp = self.authorized(self.http.get(endpoint)).send().await?;
            let page: ListBlobResponse = check(resp, "list")
                .await?
                .json()
                .await
                .map_err(|e| {
                    NotifierError::Storage(format!("Failed to parse list response: {e}"))
                })?;

            objects.extend(page.blobs.into_iter().map(|b| BlobObject {
                url: b.url,
                pathname: b.pathname,
                size: b.size,
                uploaded_at: b.uploaded_at,
            }));

            match page.cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }

        Ok(objects)
    }

    async fn get(&self, url: &str) -> Result<String, NotifierError> {
        let resp = self.http.get(url).send().await?;
        Ok(check(resp, "fetch").await?.text().await?)
    }

    async fn delete(&self, urls: &[String]) -> Result<(), NotifierError> {
        if urls.is_empty() {
            return Ok(());
        }

        let resp = self
            .authorized(self.http.post(self.endpoint("delete")?))
            .json(&serde_json::json!({ "urls": urls }))
            .send()
            .await?;
        check(resp, "delete").await?;
        Ok(())
    }
}
