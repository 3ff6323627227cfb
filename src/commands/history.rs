use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use prettytable::{format, Table};

/// Column width the prompt and response cells are truncated to.
const CELL_WIDTH: usize = 40;

/// Handle history commands
pub async fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let mut state = super::build_history_state(config)?;

    match command {
        HistoryCommand::List => {
            state.refresh().await;

            if let Some(error) = state.last_error() {
                eprintln!("{}", format!("Error: {}", error).red());
                return Ok(());
            }

            if state.entries().is_empty() {
                println!("{}", "No history found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(prettytable::row![
                "Created".bold(),
                "Prompt".bold(),
                "Response".bold()
            ]);

            for entry in state.entries() {
                table.add_row(prettytable::row![
                    entry.created_at_display().cyan(),
                    truncate(&entry.prompt),
                    truncate(&entry.response)
                ]);
            }

            println!("\nPrompt History:");
            table.printstd();
            println!();
            println!(
                "Use {} to delete an entry.",
                "promptedge history delete <CREATED_AT>".cyan()
            );
            println!();
        }
        HistoryCommand::Delete { created_at } => {
            // Optimistic: the entry disappears from the populated cache
            // immediately; a failed request is only visible on the next list.
            state.refresh().await;
            state.delete(created_at).await;
            println!("{}", format!("Deleted entry {}", created_at).green());
        }
    }

    Ok(())
}

fn truncate(text: &str) -> String {
    if text.chars().count() > CELL_WIDTH {
        let head: String = text.chars().take(CELL_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
