//! Token attachment for outbound calls
//!
//! Every outbound API call gets the current session token merged into its
//! headers as `Authorization: Bearer <token>`. The token is fetched from
//! the identity provider on every call; the resolved header is never
//! cached, so an expired session stops being attached on the next call.
//!
//! Token-fetch failures degrade to no header: the call proceeds
//! unauthenticated and the dynamic origin rejects it with its own
//! validation. The client neither retries nor surfaces the failure as a
//! user-facing error.

use std::sync::Arc;

use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};

use crate::auth::provider::IdentityProvider;

/// Attaches the current session's bearer token to outbound headers.
///
/// The provider is injected at construction and shared for the lifetime of
/// the client; the token itself is re-fetched per call.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use http::HeaderMap;
/// use promptedge::auth::{SessionToken, StaticTokenProvider, TokenAttachmentClient};
///
/// # tokio_test::block_on(async {
/// let provider = Arc::new(StaticTokenProvider::new(SessionToken::new("tok")));
/// let client = TokenAttachmentClient::new(provider);
///
/// let headers = client.with_auth_header(HeaderMap::new()).await;
/// assert_eq!(headers.get("authorization").unwrap(), "Bearer tok");
/// # });
/// ```
#[derive(Clone)]
pub struct TokenAttachmentClient {
    provider: Arc<dyn IdentityProvider>,
}

impl TokenAttachmentClient {
    /// Creates a client over the injected identity provider.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Merge `Authorization: Bearer <token>` into `base`.
    ///
    /// Fetches the session token fresh from the provider. On any failure
    /// (no session, provider error, token not renderable as a header
    /// value) the base headers are returned unchanged, so the header is
    /// absent rather than empty-valued.
    pub async fn with_auth_header(&self, base: HeaderMap) -> HeaderMap {
        let token = match self.provider.session_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Proceeding without Authorization header");
                return base;
            }
        };

        let value = match HeaderValue::from_str(&format!("Bearer {}", token.token)) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Session token is not a valid header value");
                return base;
            }
        };

        let mut headers = base;
        headers.insert(AUTHORIZATION, value);
        headers
    }
}
