use std::time::Duration;

use reqwest::{Method, Response};
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The daemon answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Connection timeout")]
    Timeout(String),

    #[error("{0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    Decode(String),
}

impl UpstreamError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Timeout(_))
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout(e.to_string())
        } else if e.is_decode() {
            UpstreamError::Decode(e.to_string())
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

/// Thin HTTP client for the model daemon's `/api/*` endpoints.
///
/// Every call carries its own timeout and is attempted once.
#[derive(Clone, Debug)]
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Issues the request and returns the response once its status is 2xx.
    /// The body is left unread, so callers may stream it.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Option<&JsonValue>,
        timeout: Duration,
    ) -> Result<Response, UpstreamError> {
        let mut req = self.client.request(method, self.url(path)).timeout(timeout);
        if let Some(body) = payload {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Http { status: status.as_u16(), body });
        }
        Ok(resp)
    }

    pub async fn request_json(
        &self,
        method: Method,
        path: &str,
        payload: Option<&JsonValue>,
        timeout: Duration,
    ) -> Result<JsonValue, UpstreamError> {
        let resp = self.send(method, path, payload, timeout).await?;
        Ok(resp.json().await?)
    }

    pub async fn get_json(&self, path: &str, timeout: Duration) -> Result<JsonValue, UpstreamError> {
        self.request_json(Method::GET, path, None, timeout).await
    }
}
