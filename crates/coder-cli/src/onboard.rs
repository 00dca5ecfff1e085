//! `coder onboard` — initialize configuration and workspace.
//!
//! - Creates `~/.coder/config.json` with defaults
//! - Creates the workspace and REPL history directories
//! - Writes a starter system prompt next to the config

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use coder_core::config::{get_config_path, save_config, Config};
use coder_core::utils::get_history_path;

/// Run the onboard command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    println!();
    println!("{}", "coder setup".cyan().bold());
    println!();

    let config_path = config_path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let data_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    // 1. System prompt template
    let prompt_path = data_dir.join("system_prompt.md");
    create_template(&prompt_path, SYSTEM_PROMPT_TEMPLATE)?;

    // 2. Config
    if write_default_config(&config_path, &prompt_path)? {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!("  {} config already exists at {}", "✓".green(), config_path.display());
    }

    // 3. Workspace
    let config = crate::helpers::load_settings(Some(&config_path))?;
    let workspace = crate::helpers::expand_tilde(&config.agent.workspace);
    std::fs::create_dir_all(&workspace)
        .with_context(|| format!("failed to create workspace: {}", workspace.display()))?;
    println!("  {} workspace at {}", "✓".green(), workspace.display());

    // 4. REPL history
    if let Some(history_dir) = get_history_path().parent() {
        std::fs::create_dir_all(history_dir)?;
    }

    println!();
    println!(
        "{}",
        "  Setup complete! Set your API key, then run `coder agent`.".green()
    );
    println!();

    Ok(())
}

/// Write a fresh config pointing at `prompt_path`, unless one already exists.
///
/// Built from `Config::default()` so env overrides (API keys included) never
/// reach the file. Returns whether a file was written.
fn write_default_config(config_path: &Path, prompt_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }
    let mut config = Config::default();
    config.agent.system_prompt_path = Some(prompt_path.to_string_lossy().to_string());
    save_config(&config, Some(config_path))
        .with_context(|| format!("failed to write config: {}", config_path.display()))?;
    Ok(true)
}

/// Create a template file if it doesn't exist.
fn create_template(path: &Path, content: &str) -> Result<()> {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    if path.exists() {
        println!("  {} {} already exists", "✓".green(), name);
    } else {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        println!("  {} created {}", "✓".green(), name);
    }
    Ok(())
}

const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are a local coding assistant.

You can read files, write files, and list directories inside the user's
workspace. Use a tool when the request needs one; otherwise answer directly
and concisely.
"#;

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_template_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("PROMPT.md");
        create_template(&path, "hello").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn create_template_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PROMPT.md");
        std::fs::write(&path, "original").unwrap();
        create_template(&path, "new content").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn default_config_leaves_env_secrets_out() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let prompt_path = dir.path().join("system_prompt.md");

        std::env::set_var("CODER_LLM__API_KEY", "sk-from-env");
        let written = write_default_config(&config_path, &prompt_path);
        std::env::remove_var("CODER_LLM__API_KEY");
        assert!(written.unwrap());

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(!content.contains("sk-from-env"));
        let saved: Config = serde_json::from_str(&content).unwrap();
        assert!(saved.llm.api_key.is_empty());
        assert_eq!(
            saved.agent.system_prompt_path.as_deref(),
            Some(prompt_path.to_string_lossy().as_ref())
        );
    }

    #[test]
    fn default_config_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"llm": {"model": "mine"}}"#).unwrap();

        assert!(!write_default_config(&config_path, &dir.path().join("p.md")).unwrap());
        assert_eq!(
            std::fs::read_to_string(&config_path).unwrap(),
            r#"{"llm": {"model": "mine"}}"#
        );
    }

    #[test]
    fn template_not_empty() {
        assert!(!SYSTEM_PROMPT_TEMPLATE.trim().is_empty());
    }
}
