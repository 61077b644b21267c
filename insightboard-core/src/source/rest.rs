//! HTTP client for the hosted backend's REST interface
//!
//! The backend exposes tables through a PostgREST-style API:
//!
//! ```text
//! GET {url}/rest/v1/{table}?select=stage,created_at&order=created_at.asc
//! apikey: <key>
//! Authorization: Bearer <key>
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use super::{FetchRequest, RecordSource};
use crate::config::SourceConfig;
use crate::error::{Error, Result, SourceError};
use crate::types::InteractionRecord;

/// Record source backed by the hosted REST API
pub struct RestSource {
    http_client: reqwest::Client,
    table_url: String,
}

impl RestSource {
    /// Create a new REST source from configuration
    ///
    /// Returns an error if the configuration is invalid or missing required fields.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config
            .resolved_url()
            .ok_or_else(|| Error::Config("source.url is required".to_string()))?
            .trim_end_matches('/')
            .to_string();
        let api_key = config
            .resolved_api_key()
            .ok_or_else(|| Error::Config("source.api_key is required".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "apikey",
            HeaderValue::from_str(&api_key)
                .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            table_url: format!(
                "{}/rest/v1/{}",
                base_url,
                urlencoding::encode(config.table.trim())
            ),
        })
    }

    /// Build the full query URL for a request
    pub fn request_url(&self, request: &FetchRequest) -> String {
        let mut url = format!(
            "{}?select={}",
            self.table_url,
            urlencoding::encode(&request.projection.select_clause())
        );
        if let Some(order) = request.order {
            url.push_str(&format!("&order=created_at.{}", order.as_str()));
        }
        if let Some(limit) = request.limit {
            url.push_str(&format!("&limit={}", limit));
        }
        url
    }
}

#[async_trait]
impl RecordSource for RestSource {
    fn name(&self) -> &str {
        "rest"
    }

    async fn fetch(
        &self,
        request: &FetchRequest,
    ) -> std::result::Result<Vec<InteractionRecord>, SourceError> {
        let url = self.request_url(request);
        tracing::debug!(url = %url, "Fetching interaction records");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        let status = response.status();

        if status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| SourceError::Request(e.to_string()))?;
            decode_rows(&body)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(SourceError::Api {
                status: status.as_u16(),
                message: api_error_message(&error_text),
            })
        }
    }
}

/// Decode a JSON array of rows.
pub(crate) fn decode_rows(
    body: &[u8],
) -> std::result::Result<Vec<InteractionRecord>, SourceError> {
    serde_json::from_slice(body).map_err(|e| SourceError::Decode(e.to_string()))
}

/// Pull the `message` field out of a PostgREST error body, if there is one.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
