//! Error types for PromptEdge
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for PromptEdge operations
///
/// This enum encompasses all possible errors that can occur during
/// edge routing, configuration loading, token attachment, and calls
/// against the dynamic origin.
#[derive(Error, Debug)]
pub enum PromptEdgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rule table construction errors (missing default, ambiguous patterns)
    #[error("Invalid rule table: {0}")]
    RuleTable(String),

    /// Request method is not permitted by the matched route rule
    #[error("Method {method} not allowed for path: {path}")]
    MethodNotAllowed {
        /// The rejected HTTP method
        method: http::Method,
        /// The request path that matched the rule
        path: String,
    },

    /// No route rule matched the request path
    #[error("No route matched path: {0}")]
    NoRouteMatched(String),

    /// Authentication errors (token retrieval, 401/403 from the origin)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Dynamic origin API errors (non-2xx status, malformed body)
    #[error("Backend error: {0}")]
    Api(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for PromptEdge operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
