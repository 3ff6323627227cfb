//! Dynamic origin API client
//!
//! Implements the compute service's HTTP contract: submit a prompt, list
//! history, delete one entry by its creation timestamp. Every request goes
//! through the token attachment client, so the `Authorization` header is
//! resolved fresh per call and absent when no session exists.

use http::header::{HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::TokenAttachmentClient;
use crate::error::{PromptEdgeError, Result};
use crate::history::entry::HistoryEntry;

/// Request body for `POST /api/prompt`.
#[derive(Debug, Serialize)]
struct PromptRequest<'a> {
    prompt: &'a str,
}

/// Response body from `POST /api/prompt`.
#[derive(Debug, Deserialize)]
struct PromptResponse {
    response: String,
}

/// HTTP client for the dynamic origin.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use promptedge::auth::{SessionToken, StaticTokenProvider, TokenAttachmentClient};
/// use promptedge::history::BackendClient;
///
/// # tokio_test::block_on(async {
/// let auth = TokenAttachmentClient::new(Arc::new(StaticTokenProvider::new(
///     SessionToken::new("tok"),
/// )));
/// let client = BackendClient::new(
///     "http://127.0.0.1:8080".parse().unwrap(),
///     auth,
///     std::time::Duration::from_secs(30),
/// )?;
///
/// let reply = client.submit_prompt("Hello").await?;
/// println!("{}", reply);
/// # anyhow::Ok(())
/// # });
/// ```
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    auth: TokenAttachmentClient,
}

impl BackendClient {
    /// Creates a client against `base_url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`PromptEdgeError::Config`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(
        base_url: Url,
        auth: TokenAttachmentClient,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PromptEdgeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    /// Submit a prompt and return the generated reply.
    ///
    /// # Errors
    ///
    /// Returns [`PromptEdgeError::Api`] on a non-success status and
    /// [`PromptEdgeError::Http`] on transport failures or a malformed body.
    pub async fn submit_prompt(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint("api/prompt")?;
        let headers = self.request_headers().await;

        let response = self
            .http
            .post(url)
            .headers(headers)
            .json(&PromptRequest { prompt })
            .send()
            .await
            .map_err(PromptEdgeError::Http)?;

        if !response.status().is_success() {
            return Err(PromptEdgeError::Api(format!(
                "Prompt submission failed with status {}",
                response.status()
            ))
            .into());
        }

        let body: PromptResponse = response.json().await.map_err(PromptEdgeError::Http)?;
        Ok(body.response)
    }

    /// Fetch all history entries for the current identity.
    ///
    /// Order is unspecified by the contract; callers sort.
    ///
    /// # Errors
    ///
    /// Returns [`PromptEdgeError::Api`] on a non-success status and
    /// [`PromptEdgeError::Http`] on transport failures or a malformed body.
    pub async fn list_history(&self) -> Result<Vec<HistoryEntry>> {
        let url = self.endpoint("api/history")?;
        let headers = self.request_headers().await;

        let response = self
            .http
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(PromptEdgeError::Http)?;

        if !response.status().is_success() {
            return Err(PromptEdgeError::Api(format!(
                "History fetch failed with status {}",
                response.status()
            ))
            .into());
        }

        let entries: Vec<HistoryEntry> = response.json().await.map_err(PromptEdgeError::Http)?;
        Ok(entries)
    }

    /// Delete the entry created at `created_at` (epoch millis).
    ///
    /// The operation is idempotent on the server side; deleting an entry
    /// that is already gone still succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`PromptEdgeError::Api`] on a non-success status and
    /// [`PromptEdgeError::Http`] on transport failures.
    pub async fn delete_entry(&self, created_at: i64) -> Result<()> {
        let url = self.endpoint(&format!("api/history/{}", created_at))?;
        let headers = self.request_headers().await;

        let response = self
            .http
            .delete(url)
            .headers(headers)
            .send()
            .await
            .map_err(PromptEdgeError::Http)?;

        if !response.status().is_success() {
            return Err(PromptEdgeError::Api(format!(
                "Deletion of entry {} failed with status {}",
                created_at,
                response.status()
            ))
            .into());
        }

        Ok(())
    }

    /// Headers for one outbound call: JSON content type plus the freshly
    /// resolved `Authorization` header, when a session exists.
    async fn request_headers(&self) -> HeaderMap {
        let mut base = HeaderMap::new();
        base.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.auth.with_auth_header(base).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| PromptEdgeError::Config(format!("Invalid endpoint path {}: {}", path, e)).into())
    }
}
