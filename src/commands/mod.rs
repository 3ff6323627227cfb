/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `serve`   — Run the edge proxy
- `route`   — Dry-run a request through the rule table
- `prompt`  — Submit one prompt and print the reply
- `history` — List or delete prior exchanges

These handlers are intentionally small and use the library components:
the edge router, the token attachment client, and the history state.
*/

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{EnvTokenProvider, TokenAttachmentClient};
use crate::config::Config;
use crate::error::Result;
use crate::history::{BackendClient, HistoryState};

// History listing and deletion
pub mod history;

/// Builds the authenticated history state the client commands share.
///
/// The identity provider reads the session token from the configured
/// environment variable; it is constructed once here and injected, so no
/// command reaches for ambient global state.
pub fn build_history_state(config: &Config) -> Result<HistoryState> {
    let provider = Arc::new(EnvTokenProvider::new(&config.identity.token_env_var));
    let auth = TokenAttachmentClient::new(provider);
    let client = BackendClient::new(
        config.client.base_url.clone(),
        auth,
        Duration::from_secs(config.client.timeout_seconds),
    )?;
    Ok(HistoryState::new(client))
}

/// Serve command handler
pub mod serve {
    //! Runs the edge proxy until the process is stopped.

    use super::*;
    use crate::edge::proxy;

    /// Start the edge proxy from the loaded configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    pub async fn run_serve(config: Config) -> Result<()> {
        proxy::serve(&config).await
    }
}

/// Route dry-run command handler
pub mod route {
    //! Evaluates one synthetic request against the rule table and prints
    //! the decision, without touching either origin.

    use super::*;
    use colored::Colorize;
    use http::Method;

    use crate::edge::{EdgeRequest, EdgeRouter, RuleTable};

    /// Evaluate a request and print the routing decision.
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `path` - Request path to evaluate
    /// * `method` - HTTP method name
    /// * `query` - Optional query string
    /// * `cookies` - Cookie pairs in `name=value` form
    /// * `headers` - Headers in `name:value` form
    ///
    /// # Errors
    ///
    /// Returns an error when the method name is invalid or the request is
    /// rejected by the rule table.
    pub fn run_route(
        config: &Config,
        path: &str,
        method: &str,
        query: Option<&str>,
        cookies: &[String],
        headers: &[String],
    ) -> Result<()> {
        let table = RuleTable::for_app(
            &config.edge.api_prefix,
            Duration::from_secs(config.edge.static_max_age_secs),
        )?;
        let router = EdgeRouter::new(table);

        let method: Method = method.to_uppercase().parse().map_err(|_| {
            crate::error::PromptEdgeError::Config(format!("Invalid HTTP method: {}", method))
        })?;

        let mut request = EdgeRequest::new(path, method);
        if let Some(query) = query {
            request = request.with_query(query);
        }
        for pair in cookies {
            match pair.split_once('=') {
                Some((name, value)) => request = request.with_cookie(name, value),
                None => {
                    eprintln!("{}", format!("Ignoring malformed cookie: {}", pair).yellow())
                }
            }
        }
        for pair in headers {
            match pair.split_once(':') {
                Some((name, value)) => {
                    request = request.with_header(name.trim(), value.trim())
                }
                None => {
                    eprintln!("{}", format!("Ignoring malformed header: {}", pair).yellow())
                }
            }
        }

        let decision = match router.route(&request) {
            Ok(decision) => decision,
            Err(e) => {
                eprintln!("{}", format!("Rejected: {}", e).red());
                return Err(e.into());
            }
        };

        println!("origin:        {}", decision.origin.to_string().cyan());
        println!("rule:          {}", decision.pattern);
        println!("cache-control: {}", decision.cache.cache_control());
        println!(
            "forward query: {}",
            if decision.forward_query { "yes" } else { "no" }
        );
        if decision.forwarded_headers.is_empty() {
            println!("forwarded headers: none");
        } else {
            println!("forwarded headers:");
            for (name, value) in decision.forwarded_headers.iter() {
                println!("  {}: {}", name, value.to_str().unwrap_or("<binary>"));
            }
        }

        Ok(())
    }

}

/// Prompt command handler
pub mod prompt {
    //! Submits one prompt through the authenticated client and prints the
    //! reply (or the fixed error message when the call fails).

    use super::*;

    /// Submit `text` and print the displayed response.
    ///
    /// Blank input is a silent no-op, matching the client contract. Call
    /// failures are already converted to the fixed error message by the
    /// history state, so this handler never returns a request error.
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `text` - The prompt text
    pub async fn run_prompt(config: &Config, text: &str) -> Result<()> {
        let mut state = build_history_state(config)?;

        state.submit(text).await;

        if !state.current_response().is_empty() {
            println!("{}", state.current_response());
        }
        Ok(())
    }

}
