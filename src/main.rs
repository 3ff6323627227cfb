//! PromptEdge - edge routing and authenticated client CLI
//!
#![doc = "PromptEdge - edge routing and authenticated client CLI"]
#![doc = "Main entry point for the PromptEdge application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use promptedge::cli::{Cli, Commands};
use promptedge::commands;
use promptedge::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Serve => {
            tracing::info!("Starting edge proxy");
            commands::serve::run_serve(config).await?;
            Ok(())
        }
        Commands::Route {
            path,
            method,
            query,
            cookies,
            headers,
        } => {
            tracing::info!("Evaluating route for path: {}", path);
            commands::route::run_route(
                &config,
                &path,
                &method,
                query.as_deref(),
                &cookies,
                &headers,
            )?;
            Ok(())
        }
        Commands::Prompt { text } => {
            tracing::info!("Submitting prompt");
            commands::prompt::run_prompt(&config, &text).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("promptedge=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
