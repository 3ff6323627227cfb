//! Client-side history state
//!
//! The cache is a disposable projection of the server's history: `refresh`
//! replaces it wholesale from a fresh fetch, and `delete` removes the
//! entry locally before the deletion request resolves. There is no
//! incremental merge; a failed deletion leaves a local/server mismatch
//! that the next refresh corrects.

use crate::history::api::BackendClient;
use crate::history::entry::HistoryEntry;

/// Fixed message shown when a submission fails, matching the application's
/// single generic failure string. Auth failures are not distinguished from
/// transport failures.
pub const SUBMIT_ERROR_MESSAGE: &str = "Error: Could not get a response from the server.";

/// History cache plus the current prompt/response display fields.
///
/// One instance exists per logical user session and is the only writer of
/// its own state. All operations handle failure locally: they log, update
/// a display field, or no-op, and leave the state usable and retryable.
pub struct HistoryState {
    client: BackendClient,
    entries: Vec<HistoryEntry>,
    current_prompt: String,
    current_response: String,
    is_loading: bool,
    last_error: Option<String>,
}

impl HistoryState {
    /// Creates an empty state backed by `client`.
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            entries: Vec::new(),
            current_prompt: String::new(),
            current_response: String::new(),
            is_loading: false,
            last_error: None,
        }
    }

    /// Cached entries, sorted descending by creation time.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The prompt currently displayed.
    pub fn current_prompt(&self) -> &str {
        &self.current_prompt
    }

    /// The response currently displayed.
    pub fn current_response(&self) -> &str {
        &self.current_response
    }

    /// `true` while a submission is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// The last refresh failure, if the most recent refresh failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace the cache from a fresh fetch.
    ///
    /// Entries are sorted descending by `created_at` (newest first). On
    /// failure the existing cache is kept and the error is recorded in
    /// [`last_error`](Self::last_error).
    pub async fn refresh(&mut self) {
        match self.client.list_history().await {
            Ok(mut entries) => {
                entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                self.entries = entries;
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "History refresh failed");
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// Submit a prompt and display the reply.
    ///
    /// Blank or whitespace-only input is a silent no-op: no request is
    /// sent and no state changes. On success the reply is displayed first
    /// and a refresh follows, so the new entry appears with its
    /// server-assigned timestamp. On failure the fixed error message is
    /// displayed and history is left untouched.
    pub async fn submit(&mut self, prompt: &str) {
        let trimmed = prompt.trim();
        if trimmed.is_empty() {
            return;
        }

        self.is_loading = true;
        self.current_prompt = prompt.to_string();
        self.current_response.clear();

        match self.client.submit_prompt(prompt).await {
            Ok(response) => {
                self.current_response = response;
                // Sequenced after the reply: the refresh picks up the new
                // entry under its server-assigned timestamp.
                self.refresh().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prompt submission failed");
                self.current_response = SUBMIT_ERROR_MESSAGE.to_string();
            }
        }

        self.is_loading = false;
    }

    /// Delete the entry created at `created_at`.
    ///
    /// The entry is removed from the local cache immediately, then the
    /// deletion request is issued. A failed request is logged and not
    /// surfaced; the mismatch it leaves stands until the next refresh.
    pub async fn delete(&mut self, created_at: i64) {
        self.entries.retain(|entry| entry.created_at != created_at);

        if let Err(e) = self.client.delete_entry(created_at).await {
            tracing::warn!(created_at, error = %e, "History deletion failed");
        }
    }

    /// Populate the display fields from the cached entry created at
    /// `created_at`, without mutating the history.
    ///
    /// Returns `false` when no such entry is cached.
    pub fn select(&mut self, created_at: i64) -> bool {
        match self.entries.iter().find(|e| e.created_at == created_at) {
            Some(entry) => {
                self.current_prompt = entry.prompt.clone();
                self.current_response = entry.response.clone();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{SessionToken, StaticTokenProvider, TokenAttachmentClient};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn state_against(server: &MockServer) -> HistoryState {
        let auth = TokenAttachmentClient::new(Arc::new(StaticTokenProvider::new(
            SessionToken::new("tok"),
        )));
        let client = BackendClient::new(
            server.uri().parse().unwrap(),
            auth,
            Duration::from_secs(5),
        )
        .unwrap();
        HistoryState::new(client)
    }

    fn entry(created_at: i64) -> serde_json::Value {
        json!({"prompt": format!("p{}", created_at), "response": format!("r{}", created_at), "createdAt": created_at})
    }

    // -----------------------------------------------------------------------
    // refresh
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_refresh_sorts_descending_by_created_at() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([entry(100), entry(300), entry(200)])),
            )
            .mount(&server)
            .await;

        let mut state = state_against(&server).await;
        state.refresh().await;

        let order: Vec<i64> = state.entries().iter().map(|e| e.created_at).collect();
        assert_eq!(order, vec![300, 200, 100]);
        assert!(state.last_error().is_none());
    }

    #[tokio::test]
    async fn test_refresh_replaces_cache_wholesale() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([entry(500)])))
            .mount(&server)
            .await;

        let mut state = state_against(&server).await;
        state.entries = vec![HistoryEntry {
            prompt: "stale".to_string(),
            response: "stale".to_string(),
            created_at: 1,
        }];

        state.refresh().await;
        assert_eq!(state.entries().len(), 1);
        assert_eq!(state.entries()[0].created_at, 500);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_cache_and_records_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut state = state_against(&server).await;
        state.entries = vec![HistoryEntry {
            prompt: "kept".to_string(),
            response: "kept".to_string(),
            created_at: 42,
        }];

        state.refresh().await;
        assert_eq!(state.entries().len(), 1);
        assert!(state.last_error().is_some());
    }

    // -----------------------------------------------------------------------
    // submit
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_submit_empty_is_a_silent_no_op() {
        let server = MockServer::start().await;
        // expect(0) turns any submission into a verification failure.
        Mock::given(method("POST"))
            .and(path("/api/prompt"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut state = state_against(&server).await;
        state.submit("").await;
        state.submit("   ").await;

        assert!(state.current_response().is_empty());
        assert!(state.current_prompt().is_empty());
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_submit_displays_reply_then_refreshes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/prompt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Hi there"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"prompt": "Hello", "response": "Hi there", "createdAt": 500},
                entry(100),
            ])))
            .mount(&server)
            .await;

        let mut state = state_against(&server).await;
        state.submit("Hello").await;

        assert_eq!(state.current_response(), "Hi there");
        // The new entry appears first, under its server-assigned timestamp.
        assert_eq!(state.entries()[0].created_at, 500);
        assert_eq!(state.entries()[0].prompt, "Hello");
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_submit_failure_shows_fixed_message_and_keeps_history() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/prompt"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut state = state_against(&server).await;
        state.entries = vec![HistoryEntry {
            prompt: "kept".to_string(),
            response: "kept".to_string(),
            created_at: 42,
        }];

        state.submit("Hello").await;

        assert_eq!(state.current_response(), SUBMIT_ERROR_MESSAGE);
        assert_eq!(state.entries().len(), 1);
        assert!(!state.is_loading());
    }

    // -----------------------------------------------------------------------
    // delete
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_delete_removes_locally_before_request_resolves() {
        let server = MockServer::start().await;
        // The server answers slowly; the local removal must not wait on it.
        Mock::given(method("DELETE"))
            .and(path("/api/history/300"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(50)))
            .mount(&server)
            .await;

        let mut state = state_against(&server).await;
        state.entries = vec![
            HistoryEntry {
                prompt: "a".to_string(),
                response: "a".to_string(),
                created_at: 300,
            },
            HistoryEntry {
                prompt: "b".to_string(),
                response: "b".to_string(),
                created_at: 100,
            },
        ];

        state.delete(300).await;

        let remaining: Vec<i64> = state.entries().iter().map(|e| e.created_at).collect();
        assert_eq!(remaining, vec![100]);
    }

    #[tokio::test]
    async fn test_delete_failure_is_not_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/history/300"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut state = state_against(&server).await;
        state.entries = vec![HistoryEntry {
            prompt: "a".to_string(),
            response: "a".to_string(),
            created_at: 300,
        }];

        state.delete(300).await;

        // Optimistically removed despite the server-side failure; the
        // mismatch stands until the next refresh.
        assert!(state.entries().is_empty());
        assert!(state.last_error().is_none());
    }

    // -----------------------------------------------------------------------
    // select
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_select_populates_display_without_mutating_history() {
        let server = MockServer::start().await;
        let mut state = state_against(&server).await;
        state.entries = vec![
            HistoryEntry {
                prompt: "first".to_string(),
                response: "one".to_string(),
                created_at: 300,
            },
            HistoryEntry {
                prompt: "second".to_string(),
                response: "two".to_string(),
                created_at: 100,
            },
        ];

        assert!(state.select(100));
        assert_eq!(state.current_prompt(), "second");
        assert_eq!(state.current_response(), "two");
        assert_eq!(state.entries().len(), 2);
    }

    #[tokio::test]
    async fn test_select_unknown_entry_returns_false() {
        let server = MockServer::start().await;
        let mut state = state_against(&server).await;
        assert!(!state.select(999));
        assert!(state.current_prompt().is_empty());
    }
}
