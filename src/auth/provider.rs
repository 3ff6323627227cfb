//! Identity provider contract
//!
//! The identity provider is an external collaborator; this module carries
//! only the contract the application depends on: retrieving the current
//! session's bearer token and signing out. Tokens are opaque, time-bounded,
//! and owned by the provider. Callers re-fetch per outbound call rather
//! than storing a token, so a stale token is never reused across calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::RwLock;

use crate::error::{PromptEdgeError, Result};

/// An opaque bearer token for the current session.
///
/// The `expires_at` field is a UTC timestamp; tokens with no expiry are
/// treated as non-expiring.
///
/// # Examples
///
/// ```
/// use promptedge::auth::SessionToken;
///
/// let token = SessionToken::new("my_token");
/// assert!(!token.is_expired());
/// ```
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// The opaque bearer string
    pub token: String,
    /// UTC timestamp at which the token expires, when known
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionToken {
    /// Creates a non-expiring token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    /// Creates a token with a known expiry.
    pub fn with_expiry(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at: Some(expires_at),
        }
    }

    /// Returns `true` when the token is expired or about to expire.
    ///
    /// A 60-second buffer is applied so that callers do not attach a token
    /// that will be rejected by the origin mid-flight.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, Utc};
    /// use promptedge::auth::SessionToken;
    ///
    /// let past = SessionToken::with_expiry("tok", Utc::now() - Duration::seconds(1));
    /// assert!(past.is_expired());
    ///
    /// let future = SessionToken::with_expiry("tok", Utc::now() + Duration::hours(1));
    /// assert!(!future.is_expired());
    /// ```
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(60);
                Utc::now() >= expires_at - buffer
            }
        }
    }
}

/// Contract for the external identity provider.
///
/// Implementations issue tokens scoped to one user, verifiable by the
/// dynamic origin against the provider's issuer identity. The provider is
/// injected explicitly at construction of whatever consumes it (one
/// instance per application lifecycle, torn down via [`sign_out`]) rather
/// than reached through ambient global state.
///
/// [`sign_out`]: IdentityProvider::sign_out
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The current session's token.
    ///
    /// # Errors
    ///
    /// Returns [`PromptEdgeError::Authentication`] when there is no usable
    /// session (never signed in, signed out, or the token is expired with
    /// no way to refresh).
    async fn session_token(&self) -> Result<SessionToken>;

    /// Ends the current session.
    async fn sign_out(&self) -> Result<()>;
}

/// Provider that reads the session token from an environment variable.
///
/// This is the CLI-facing provider: an operator exports the token obtained
/// from the real identity provider's sign-in flow, and every call re-reads
/// the variable so a rotated token takes effect immediately.
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    /// Creates a provider reading from the named environment variable.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl IdentityProvider for EnvTokenProvider {
    async fn session_token(&self) -> Result<SessionToken> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(SessionToken::new(token)),
            _ => Err(PromptEdgeError::Authentication(format!(
                "No session token in environment variable {}",
                self.var
            ))
            .into()),
        }
    }

    async fn sign_out(&self) -> Result<()> {
        std::env::remove_var(&self.var);
        Ok(())
    }
}

/// Provider holding a fixed token in memory.
///
/// Used by tests and local development. Signing out clears the token, after
/// which [`session_token`](IdentityProvider::session_token) fails until a
/// new provider is constructed.
pub struct StaticTokenProvider {
    token: RwLock<Option<SessionToken>>,
}

impl StaticTokenProvider {
    /// Creates a provider that hands out `token`.
    pub fn new(token: SessionToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenProvider {
    async fn session_token(&self) -> Result<SessionToken> {
        let guard = self
            .token
            .read()
            .map_err(|_| PromptEdgeError::Authentication("Token lock poisoned".to_string()))?;

        match guard.as_ref() {
            Some(token) if !token.is_expired() => Ok(token.clone()),
            Some(_) => {
                Err(PromptEdgeError::Authentication("Session token expired".to_string()).into())
            }
            None => Err(PromptEdgeError::Authentication("Signed out".to_string()).into()),
        }
    }

    async fn sign_out(&self) -> Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| PromptEdgeError::Authentication("Token lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}
