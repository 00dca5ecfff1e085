//! Coder CLI — entry point.
//!
//! # Commands
//!
//! - `coder agent [-t TASK] [--logs]` — run one task, or start the REPL
//! - `coder onboard` — initialize config + workspace
//! - `coder status` — show configuration and provider status

mod helpers;
mod onboard;
mod repl;
mod status;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use coder_agent::{builtin_registry, load_system_prompt, InteractionOrchestrator};
use coder_core::config::Config;
use coder_providers::create_gateway;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Local coding agent: picks a tool for each request, or answers directly
#[derive(Parser)]
#[command(name = "coder", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.coder/config.json
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single task, or chat interactively when no task is given
    Agent {
        /// Task to run (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        task: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Initialize configuration and workspace
    Onboard,

    /// Show configuration and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Agent { task, logs } => {
            let config = helpers::load_settings(config_path)?;
            init_logging(logs, &config.logging.level);
            run_agent(&config, task).await
        }
        Commands::Onboard => onboard::run(config_path),
        Commands::Status => status::run(config_path),
    }
}

// ─────────────────────────────────────────────
// Agent command
// ─────────────────────────────────────────────

async fn run_agent(config: &Config, task: Option<String>) -> Result<()> {
    let mut orchestrator = build_orchestrator(config)?;

    match task {
        Some(task) => {
            info!("running single task");
            let reply = orchestrator
                .run_interaction(&task)
                .await
                .context("interaction failed")?;
            helpers::print_response(&reply);
        }
        None => repl::run(orchestrator).await?,
    }

    Ok(())
}

/// Build an `InteractionOrchestrator` from the loaded configuration.
fn build_orchestrator(config: &Config) -> Result<InteractionOrchestrator> {
    let workspace = helpers::expand_tilde(&config.agent.workspace);
    std::fs::create_dir_all(&workspace)
        .with_context(|| format!("failed to create workspace: {}", workspace.display()))?;

    let prompt_path = config
        .agent
        .system_prompt_path
        .as_deref()
        .map(helpers::expand_tilde);
    let system_prompt = load_system_prompt(prompt_path.as_deref());

    let gateway = create_gateway(&config.llm)
        .context("failed to create LLM gateway")?
        .with_system_prompt(system_prompt);

    let registry = builtin_registry(&workspace, config.agent.restrict_to_workspace)
        .context("failed to register built-in tools")?;

    let orchestrator = InteractionOrchestrator::new(Arc::new(gateway), registry);
    Ok(match config.llm.timeout_secs {
        0 => orchestrator,
        secs => orchestrator.with_timeout(Duration::from_secs(secs)),
    })
}

/// Initialize tracing/logging.
///
/// `--logs` wins over the configured level.
fn init_logging(verbose: bool, level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("coder=debug,info")
    } else {
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_agent_task() {
        let cli = Cli::parse_from(["coder", "agent", "--task", "list files", "--logs"]);
        match cli.command {
            Commands::Agent { task, logs } => {
                assert_eq!(task.as_deref(), Some("list files"));
                assert!(logs);
            }
            _ => panic!("expected agent command"),
        }
    }

    #[test]
    fn build_orchestrator_with_local_provider() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.llm.provider = "local".into();
        config.llm.model = "llama3".into();
        config.agent.workspace = dir.path().join("ws").to_string_lossy().to_string();

        let orchestrator = build_orchestrator(&config).unwrap();
        assert!(dir.path().join("ws").is_dir());
        assert_eq!(
            orchestrator.registry().tool_names(),
            vec!["read_file", "write_file", "list_dir"]
        );
        assert!(orchestrator.history().is_empty());
    }

    #[test]
    fn build_orchestrator_rejects_unknown_provider() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.llm.provider = "nonexistent".into();
        config.agent.workspace = dir.path().to_string_lossy().to_string();

        assert!(build_orchestrator(&config).is_err());
    }
}
