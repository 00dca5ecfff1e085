//! Error types shared by the registry, the gateways, and the orchestrator.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while registering or executing tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The schema is missing its name or declares malformed parameters.
    #[error("Invalid tool schema: {0}")]
    InvalidSchema(String),

    #[error("Tool '{0}' not found.")]
    NotFound(String),

    /// Bad arguments or a failure inside the tool body.
    #[error("Tool '{tool}' failed: {source}")]
    Execution {
        tool: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl ToolError {
    /// Wrap a tool-body failure.
    pub fn execution(tool: impl Into<String>, source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        ToolError::Execution {
            tool: tool.into(),
            source: source.into(),
        }
    }
}

/// Errors raised by an LLM gateway (network, auth, quota, bad payloads).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider configuration error: {0}")]
    Config(String),

    #[error("request to LLM failed: {0}")]
    Request(String),

    #[error("LLM API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid LLM response: {0}")]
    InvalidResponse(String),

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("LLM call timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Errors raised while loading the configuration.
///
/// A missing config file is not an error; defaults are used instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: '{value}'")]
    InvalidEnv { key: String, value: String },
}
