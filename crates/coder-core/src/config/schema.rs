//! Configuration schema.
//!
//! Hierarchy: `Config` → `LlmConfig`, `AgentConfig`, `LoggingConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

/// Root configuration — loaded from `~/.coder/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub llm: LlmConfig,
    pub agent: AgentConfig,
    pub logging: LoggingConfig,
}

// ─────────────────────────────────────────────
// LLM
// ─────────────────────────────────────────────

/// Which backend to talk to and how.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmConfig {
    /// Provider name: `openai`, `local`, `openrouter`, `deepseek`.
    pub provider: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// API key. Empty means "read the provider's environment variable".
    pub api_key: String,
    /// Custom API base URL (overrides the provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Per-call timeout in seconds. 0 disables the orchestrator-level timeout.
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Whether an API key was set in the config file or `CODER_LLM__API_KEY`.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4-turbo".to_string(),
            api_key: String::new(),
            api_base: None,
            temperature: 0.1,
            max_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Agent behavior and workspace.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Workspace directory the filesystem tools operate in.
    pub workspace: String,
    /// Optional file holding the system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt_path: Option<String>,
    /// Confine filesystem tools to the workspace.
    pub restrict_to_workspace: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            workspace: "~/.coder/workspace".to_string(),
            system_prompt_path: None,
            restrict_to_workspace: false,
        }
    }
}

// ─────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `--logs` is not given.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}
