//! Saved session commands: `copysmith sessions`.

use anyhow::Result;
use console::style;
use std::path::Path;

use copysmith::store::SessionStore;
use copysmith::ui::display::print_items;

use super::super::SessionsCommands;
use super::load_config;

fn snippet(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

pub fn cmd_sessions(project_dir: &Path, command: Option<SessionsCommands>) -> Result<()> {
    let config = load_config(project_dir, false)?;
    let store = SessionStore::new(&config.sessions_dir);

    match command {
        None | Some(SessionsCommands::List) => {
            let sessions = store.list()?;
            println!();
            if sessions.is_empty() {
                println!("No saved sessions.");
                println!();
                println!("Run 'copysmith generate --request <file>' to create one.");
                println!();
                return Ok(());
            }
            for record in &sessions {
                println!(
                    "  {}  {}  {:>2} items  {:>6} tokens  {}",
                    style(record.short_id()).bold(),
                    record.created_at.format("%Y-%m-%d %H:%M"),
                    record.items.len(),
                    record.tokens_used,
                    style(snippet(&record.request.input_text, 48)).dim()
                );
            }
            println!();
            println!("{} session(s)", sessions.len());
            println!();
        }
        Some(SessionsCommands::Show { id }) => {
            let record = store.load(&id)?;
            println!();
            println!("Session: {}", record.id);
            println!("Created: {}", record.created_at.format("%Y-%m-%d %H:%M:%S"));
            println!("Updated: {}", record.updated_at.format("%Y-%m-%d %H:%M:%S"));
            println!(
                "Model:   {} | {} | {} | {} words",
                record.request.model.display_name(),
                record.request.mode,
                record.request.tone,
                record.request.target_word_count()
            );
            println!("Tokens:  {}", record.tokens_used);
            print_items(&record.items);
        }
    }

    Ok(())
}
