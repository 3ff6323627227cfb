//! PromptEdge - edge routing and authenticated client library
//!
//! This library provides the core functionality for the PromptEdge
//! application: path-based edge routing with per-rule cache and forwarding
//! policy, identity-token attachment for outbound calls, and the
//! client-side history state.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `edge`: Route rule table, request evaluation, and the proxy server
//! - `auth`: Identity provider contract and token attachment
//! - `history`: Dynamic origin API client and client-side history cache
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use promptedge::Config;
//! use promptedge::edge::proxy;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     proxy::serve(&config).await
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod edge;
pub mod error;
pub mod history;

// Re-export commonly used types
pub use auth::{IdentityProvider, SessionToken, TokenAttachmentClient};
pub use config::Config;
pub use edge::{EdgeRequest, EdgeRouter, OriginKind, RouteDecision, RuleTable};
pub use error::{PromptEdgeError, Result};
pub use history::{BackendClient, HistoryEntry, HistoryState};

#[cfg(test)]
pub mod test_utils;
