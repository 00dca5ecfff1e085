//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use coder_agent::InteractionOrchestrator;
use coder_core::utils::get_history_path;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// What a line of input asks the REPL to do.
#[derive(Debug, PartialEq)]
enum ReplAction<'a> {
    Skip,
    Exit,
    Reset,
    ListTools,
    Prompt(&'a str),
}

fn classify(input: &str) -> ReplAction<'_> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return ReplAction::Skip;
    }
    if is_exit_command(trimmed) {
        return ReplAction::Exit;
    }
    match trimmed {
        "/reset" => ReplAction::Reset,
        "/tools" => ReplAction::ListTools,
        _ => ReplAction::Prompt(trimmed),
    }
}

/// Run the interactive REPL loop.
pub async fn run(mut orchestrator: InteractionOrchestrator) -> Result<()> {
    helpers::print_banner(orchestrator.gateway_name());

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            // Ctrl-C / Ctrl-D — exit cleanly
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        match classify(&input) {
            ReplAction::Skip => continue,
            ReplAction::Exit => {
                println!("\nGoodbye!");
                break;
            }
            ReplAction::Reset => {
                orchestrator.clear_history();
                println!("{}", "Conversation cleared.".dimmed());
            }
            ReplAction::ListTools => print_tools(&orchestrator),
            ReplAction::Prompt(prompt) => {
                let _ = editor.add_history_entry(prompt);
                debug!(input = prompt, "processing input");
                helpers::print_thinking();

                let result = orchestrator.run_interaction(prompt).await;
                helpers::clear_thinking();
                match result {
                    Ok(reply) => helpers::print_response(&reply),
                    Err(e) => eprintln!("\n{} {e}\n", "Error:".red().bold()),
                }
            }
        }
    }

    save_history(&mut editor);

    Ok(())
}

fn print_tools(orchestrator: &InteractionOrchestrator) {
    let schemas = orchestrator.registry().list_schemas();
    if schemas.is_empty() {
        println!("{}", "(no tools registered)".dimmed());
        return;
    }
    for schema in schemas {
        let params: Vec<&str> = schema.parameters.iter().map(|p| p.name.as_str()).collect();
        println!(
            "  {}({})  {}",
            schema.name.bold(),
            params.join(", "),
            schema.description.dimmed()
        );
    }
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = get_history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = get_history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command("/quit"));
        assert!(is_exit_command(":q"));
        assert!(!is_exit_command("hello"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn classify_input() {
        assert_eq!(classify("   "), ReplAction::Skip);
        assert_eq!(classify(" quit "), ReplAction::Exit);
        assert_eq!(classify("/reset"), ReplAction::Reset);
        assert_eq!(classify("/tools"), ReplAction::ListTools);
        assert_eq!(
            classify("  read main.rs \n"),
            ReplAction::Prompt("read main.rs")
        );
    }

    #[test]
    fn history_path_under_data_dir() {
        let path = get_history_path();
        assert!(path.to_string_lossy().contains(".coder"));
        assert!(path.ends_with("history/cli_history"));
    }
}
