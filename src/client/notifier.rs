use serde::Deserialize;
use std::time::Duration;

use crate::error::NotifierError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A valid token as reported by `GET /api/notifier`.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchedToken {
    pub access_token: String,
    pub expires_in_hours: Option<f64>,
    pub stored_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NotifierResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    is_valid: bool,
    access_token: Option<String>,
    expires_in_hours: Option<f64>,
    stored_at: Option<String>,
}

/// What the notifier said about the token.
#[derive(Debug)]
pub enum FetchOutcome {
    Valid(FetchedToken),
    /// 200, but the body did not flag the token as usable.
    Invalid,
    NotFound,
    Expired,
    Unexpected { status: u16, body: String },
}

pub struct NotifierClient {
    endpoint: String,
    http: reqwest::Client,
}

impl NotifierClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, NotifierError> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| NotifierError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    pub async fn fetch_token(&self) -> Result<FetchOutcome, NotifierError> {
        let resp = self.http.get(&self.endpoint).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(interpret(status, &body))
    }
}

fn interpret(status: u16, body: &str) -> FetchOutcome {
    match status {
        200 => match serde_json::from_str::<NotifierResponse>(body) {
            Ok(NotifierResponse {
                success: true,
                is_valid: true,
                access_token: Some(access_token),
                expires_in_hours,
                stored_at,
            }) => FetchOutcome::Valid(FetchedToken {
                access_token,
                expires_in_hours,
                stored_at,
            }),
            _ => FetchOutcome::Invalid,
        },
        404 => FetchOutcome::NotFound,
        410 => FetchOutcome::Expired,
        _ => FetchOutcome::Unexpected {
            status,
            body: body.to_string(),
        },
    }
}
