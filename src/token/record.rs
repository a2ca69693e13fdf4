use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::NotifierError;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// An epoch-millisecond timestamp as sent by the broker.
///
/// Upstox delivers these as numeric strings (`"1731448800000"`), but plain
/// JSON numbers are accepted too. The original form is kept on write so the
/// stored object echoes what was posted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EpochMillis {
    Number(i64),
    Text(String),
}

impl EpochMillis {
    pub fn as_millis(&self) -> Option<i64> {
        match self {
            EpochMillis::Number(n) => Some(*n),
            EpochMillis::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Inbound body of `POST /api/notifier`.
///
/// Unknown fields (e.g. `message_type`) are accepted and dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenPayload {
    pub access_token: Option<String>,
    pub expires_at: Option<EpochMillis>,
    pub issued_at: Option<EpochMillis>,
    pub client_id: Option<String>,
    pub user_id: Option<String>,
    pub token_type: Option<String>,
}

/// The JSON object persisted in blob storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(default)]
    pub expires_at: Option<EpochMillis>,
    #[serde(default)]
    pub issued_at: Option<EpochMillis>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// RFC 3339 UTC timestamp taken when the record was written.
    pub stored_at: String,
}

/// Validity of a record at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenStatus {
    pub is_valid: bool,
    /// Hours until expiry, two decimals. Negative once expired, `None` if
    /// the record carries no usable expiry.
    pub expires_in_hours: Option<f64>,
}

impl TokenRecord {
    /// Build a record from a POST body, stamping `stored_at` with `now`.
    pub fn from_payload(payload: TokenPayload, now: DateTime<Utc>) -> Result<Self, NotifierError> {
        let access_token = payload
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| NotifierError::BadRequest("access_token is required".into()))?;

        Ok(Self {
            access_token,
            expires_at: payload.expires_at,
            issued_at: payload.issued_at,
            client_id: payload.client_id,
            user_id: payload.user_id,
            token_type: payload.token_type,
            stored_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    pub fn expires_at_millis(&self) -> Option<i64> {
        self.expires_at.as_ref().and_then(EpochMillis::as_millis)
    }

    pub fn status(&self, now: DateTime<Utc>) -> TokenStatus {
        // checked_sub: an expiry far enough in the past underflows i64.
        let remaining = self
            .expires_at_millis()
            .and_then(|expires_at| expires_at.checked_sub(now.timestamp_millis()));

        match remaining {
            Some(remaining) => {
                let hours = (remaining as f64 / MILLIS_PER_HOUR * 100.0).round() / 100.0;
                TokenStatus {
                    is_valid: remaining > 0,
                    expires_in_hours: Some(hours),
                }
            }
            None => TokenStatus {
                is_valid: false,
                expires_in_hours: None,
            },
        }
    }

    /// Leading characters of the token, safe for logs.
    pub fn preview(&self) -> &str {
        let end = self
            .access_token
            .char_indices()
            .nth(20)
            .map(|(i, _)| i)
            .unwrap_or(self.access_token.len());
        &self.access_token[..end]
    }
}
