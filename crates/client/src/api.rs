//! REST client for the remote scene generation endpoint.
//!
//! One call: submit a [`SubmitRequest`] and get back the task id the remote
//! side will later use in its callback.

use std::time::Duration;

use scenegen_core::error::CoreError;
use scenegen_core::retry::is_rate_limit_message;

use crate::messages::{SubmitRequest, SubmitResponse};

/// HTTP status the remote API uses for throttling.
const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Errors from submitting a generation request.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The HTTP request itself failed (network, DNS, TLS, decode, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Generation API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The API answered but refused the request (`code != 0`).
    #[error("Generation API rejected request (code {code}): {msg}")]
    Rejected { code: i64, msg: String },

    /// The request was accepted but its task record could not be written.
    #[error("Failed to persist task record: {0}")]
    Persist(#[from] CoreError),
}

impl SubmitError {
    /// Whether this failure is the remote side asking us to slow down:
    /// HTTP 429, or an error whose text mentions `429` / `rate limit`.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::ApiError { status, .. } if *status == STATUS_TOO_MANY_REQUESTS => true,
            Self::Persist(_) => false,
            other => is_rate_limit_message(&other.to_string()),
        }
    }
}

/// HTTP client for the generation endpoint.
pub struct SceneGenApi {
    client: reqwest::Client,
    api_url: String,
}

impl SceneGenApi {
    /// Create a client posting to `api_url` with a per-request `timeout`.
    pub fn new(api_url: String, timeout: Duration) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_url })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Submit one generation request.
    ///
    /// Returns the accepted response; a non-2xx status or a non-zero `code`
    /// is an error.
    pub async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse, SubmitError> {
        let response = self.client.post(&self.api_url).json(request).send().await?;
        let response = Self::ensure_success(response).await?;
        let body: SubmitResponse = response.json().await?;

        if body.code != 0 {
            return Err(SubmitError::Rejected {
                code: body.code,
                msg: body.msg,
            });
        }
        Ok(body)
    }

    /// Turn a non-2xx response into [`SubmitError::ApiError`] carrying the
    /// status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SubmitError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SubmitError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}
