//! Provider registry — static specs for the supported LLM backends.
//!
//! Every backend speaks the OpenAI `/chat/completions` protocol; the specs only
//! differ in where they live and how they authenticate.

use coder_core::ProviderError;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static description of one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name used in config (e.g. `"openai"`).
    pub name: &'static str,
    /// Human-readable name for logs. E.g. `"OpenAI"`.
    pub display_name: &'static str,
    /// Environment variable holding the API key, if the provider has one.
    pub env_key: Option<&'static str>,
    /// API base used when the config does not set one.
    pub default_api_base: &'static str,
    /// Key sent when none is configured (local servers ignore it).
    pub default_api_key: Option<&'static str>,
    /// Whether this is a local/self-hosted server (Ollama, vLLM, llama.cpp).
    pub is_local: bool,
}

/// Supported providers.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "openai",
        display_name: "OpenAI",
        env_key: Some("OPENAI_API_KEY"),
        default_api_base: "https://api.openai.com/v1",
        default_api_key: None,
        is_local: false,
    },
    // Ollama and other OpenAI-compatible local servers.
    ProviderSpec {
        name: "local",
        display_name: "Local",
        env_key: None,
        default_api_base: "http://localhost:11434/v1",
        default_api_key: Some("ollama"),
        is_local: true,
    },
    ProviderSpec {
        name: "openrouter",
        display_name: "OpenRouter",
        env_key: Some("OPENROUTER_API_KEY"),
        default_api_base: "https://openrouter.ai/api/v1",
        default_api_key: None,
        is_local: false,
    },
    ProviderSpec {
        name: "deepseek",
        display_name: "DeepSeek",
        env_key: Some("DEEPSEEK_API_KEY"),
        default_api_base: "https://api.deepseek.com/v1",
        default_api_key: None,
        is_local: false,
    },
];

/// Find a provider spec by config name (case-insensitive).
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    let name = name.trim().to_lowercase();
    PROVIDERS.iter().find(|s| s.name == name)
}

/// Resolve the API key: explicit config value, then the provider's env var,
/// then the provider's built-in default.
pub fn resolve_api_key(configured: &str, spec: &ProviderSpec) -> Result<String, ProviderError> {
    if !configured.is_empty() {
        return Ok(configured.to_string());
    }
    if let Some(env_key) = spec.env_key {
        if let Ok(val) = std::env::var(env_key) {
            if !val.is_empty() {
                return Ok(val);
            }
        }
    }
    if let Some(default) = spec.default_api_key {
        return Ok(default.to_string());
    }
    Err(ProviderError::Config(format!(
        "{} environment variable not set.",
        spec.env_key.unwrap_or("API key")
    )))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
