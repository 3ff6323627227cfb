//! Command-line interface definition for PromptEdge
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for running the edge proxy, dry-running the rule
//! table, submitting prompts, and managing history.

use clap::{Parser, Subcommand};
use url::Url;

/// PromptEdge - edge routing and authenticated client for a
/// prompt/response application
///
/// Serve the edge proxy in front of the static and dynamic origins, or
/// talk to the backend as an authenticated client.
#[derive(Parser, Debug, Clone)]
#[command(name = "promptedge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the base URL client commands are issued against
    #[arg(long)]
    pub base_url: Option<Url>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for PromptEdge
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the edge proxy
    Serve,

    /// Dry-run one request through the rule table and print the decision
    Route {
        /// Request path to evaluate
        #[arg(short, long)]
        path: String,

        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Query string, without the leading '?'
        #[arg(short, long)]
        query: Option<String>,

        /// Cookie pair in name=value form (repeatable)
        #[arg(long = "cookie")]
        cookies: Vec<String>,

        /// Header in name:value form (repeatable)
        #[arg(long = "header")]
        headers: Vec<String>,
    },

    /// Submit one prompt and print the reply
    Prompt {
        /// The prompt text
        text: String,
    },

    /// Browse or delete prior exchanges
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// History subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List all entries, newest first
    List,

    /// Delete one entry by its creation timestamp (epoch millis)
    Delete {
        /// Creation timestamp of the entry to delete
        created_at: i64,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            base_url: None,
            command: Commands::Serve,
        }
    }
}
