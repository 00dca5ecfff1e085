//! `coder status` — show configuration and provider status.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;

use coder_core::config::{get_config_path, LlmConfig};
use coder_providers::registry::{find_by_name, ProviderSpec, PROVIDERS};

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = crate::helpers::load_settings(config_path)?;
    let config_path = config_path.map(PathBuf::from).unwrap_or_else(get_config_path);

    println!();
    println!("{}", "coder status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        presence(config_path.exists())
    );

    let workspace = crate::helpers::expand_tilde(&config.agent.workspace);
    println!(
        "  {:<18} {} {}",
        "Workspace:".bold(),
        workspace.display(),
        presence(workspace.exists())
    );
    if config.agent.restrict_to_workspace {
        println!("  {:<18} {}", "".bold(), "(tools restricted to workspace)".dimmed());
    }

    if let Some(prompt) = &config.agent.system_prompt_path {
        let prompt = crate::helpers::expand_tilde(prompt);
        println!(
            "  {:<18} {} {}",
            "System prompt:".bold(),
            prompt.display(),
            presence(prompt.exists())
        );
    }

    let provider = match find_by_name(&config.llm.provider) {
        Some(spec) => spec.display_name.to_string(),
        None => format!("{} {}", config.llm.provider, "(unsupported)".red()),
    };
    println!("  {:<18} {}", "Provider:".bold(), provider);
    println!("  {:<18} {}", "Model:".bold(), config.llm.model);
    println!(
        "  {:<18} {} | {} | {}",
        "Parameters:".bold(),
        format!("temp: {}", config.llm.temperature).dimmed(),
        format!("max_tokens: {}", config.llm.max_tokens).dimmed(),
        format!("timeout: {}s", config.llm.timeout_secs).dimmed(),
    );

    println!();
    println!("  {}", "API keys:".bold());
    for spec in PROVIDERS {
        println!("    {:<20} {}", spec.display_name, key_status(spec, &config.llm));
    }

    println!();

    Ok(())
}

fn presence(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}

/// Where the key for `spec` would come from, if anywhere.
fn key_status(spec: &ProviderSpec, llm: &LlmConfig) -> String {
    let selected = find_by_name(&llm.provider).is_some_and(|s| s.name == spec.name);
    if selected && llm.has_api_key() {
        return format!("{} (key set in config)", "✓".green());
    }
    if let Some(env_key) = spec.env_key {
        if std::env::var(env_key).is_ok_and(|v| !v.is_empty()) {
            return format!("{} ({env_key} set)", "✓".green());
        }
    }
    if spec.is_local {
        return format!("{}", "· no key needed".dimmed());
    }
    format!("{}", "· not configured".dimmed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_provider_needs_no_key() {
        let spec = find_by_name("local").unwrap();
        let status = key_status(spec, &LlmConfig::default());
        assert!(status.contains("no key needed"));
    }

    #[test]
    fn configured_key_only_counts_for_selected_provider() {
        let llm = LlmConfig {
            provider: "deepseek".into(),
            api_key: "sk-test".into(),
            ..LlmConfig::default()
        };
        let deepseek = find_by_name("deepseek").unwrap();
        assert!(key_status(deepseek, &llm).contains("key set in config"));

        let openrouter = find_by_name("openrouter").unwrap();
        assert!(!key_status(openrouter, &llm).contains("key set in config"));
    }
}
