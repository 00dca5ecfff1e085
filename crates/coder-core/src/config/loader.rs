//! Config loader — reads `~/.coder/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.coder/config.json`
//! 3. Environment variables `CODER_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::schema::Config;
use crate::error::ConfigError;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the given path (or the default one) + env vars.
///
/// A missing file yields `Config::default()`. An unreadable or malformed file,
/// or an env override that doesn't parse, is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path)?)
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `CODER_<SECTION>__<FIELD>` (double underscore as delimiter).
fn apply_env_overrides(mut config: Config) -> Result<Config, ConfigError> {
    // LLM
    if let Ok(val) = std::env::var("CODER_LLM__PROVIDER") {
        config.llm.provider = val;
    }
    if let Ok(val) = std::env::var("CODER_LLM__MODEL") {
        config.llm.model = val;
    }
    if let Ok(val) = std::env::var("CODER_LLM__API_KEY") {
        config.llm.api_key = val;
    }
    if let Ok(val) = std::env::var("CODER_LLM__API_BASE") {
        config.llm.api_base = Some(val);
    }
    if let Some(t) = parsed_env("CODER_LLM__TEMPERATURE")? {
        config.llm.temperature = t;
    }
    if let Some(n) = parsed_env("CODER_LLM__MAX_TOKENS")? {
        config.llm.max_tokens = n;
    }
    if let Some(n) = parsed_env("CODER_LLM__TIMEOUT_SECS")? {
        config.llm.timeout_secs = n;
    }

    // Agent
    if let Ok(val) = std::env::var("CODER_AGENT__WORKSPACE") {
        config.agent.workspace = val;
    }
    if let Ok(val) = std::env::var("CODER_AGENT__SYSTEM_PROMPT_PATH") {
        config.agent.system_prompt_path = Some(val);
    }
    if let Ok(val) = std::env::var("CODER_AGENT__RESTRICT_TO_WORKSPACE") {
        config.agent.restrict_to_workspace = match val.as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => {
                return Err(ConfigError::InvalidEnv {
                    key: "CODER_AGENT__RESTRICT_TO_WORKSPACE".into(),
                    value: val,
                });
            }
        };
    }

    // Logging
    if let Ok(val) = std::env::var("CODER_LOGGING__LEVEL") {
        config.logging.level = val;
    }

    Ok(config)
}

fn parsed_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    let Ok(val) = std::env::var(key) else {
        return Ok(None);
    };
    val.parse().map(Some).map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: val,
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    /// Env overrides are process-global; tests touching them take this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn with_env<T>(key: &str, value: &str, f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var(key, value);
        let result = f();
        std::env::remove_var(key);
        result
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json")).unwrap();
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "llm": {
                "provider": "local",
                "model": "llama3",
                "maxTokens": 2048
            },
            "agent": {
                "systemPromptPath": "/etc/coder/prompt.txt"
            }
        }"#,
        );

        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.llm.provider, "local");
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(
            config.agent.system_prompt_path.as_deref(),
            Some("/etc/coder/prompt.txt")
        );
        // Default preserved
        assert_eq!(config.llm.temperature, 0.1);
    }

    #[test]
    fn test_load_malformed_json_is_an_error() {
        let file = write_temp_json(r#"{"llm": {"provider": "local", "model": "llama3",}}"#);

        let err = load_config_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_load_config_reports_malformed_file() {
        let file = write_temp_json("not valid json {{{");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().starts_with("invalid JSON in config file"));
    }

    #[test]
    fn test_load_empty_json() {
        let file = write_temp_json("{}");
        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.llm.timeout_secs, 120);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.llm.model = "deepseek-chat".to_string();
        config.llm.api_key = "sk-test".to_string();

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path).unwrap();
        assert_eq!(reloaded.llm.model, "deepseek-chat");
        assert_eq!(reloaded.llm.api_key, "sk-test");
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        save_config(&Config::default(), Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert!(raw["llm"].get("maxTokens").is_some());
        assert!(raw["llm"].get("max_tokens").is_none());
    }

    #[test]
    fn test_env_override_model() {
        let config = with_env("CODER_LLM__MODEL", "test-model", || {
            apply_env_overrides(Config::default()).unwrap()
        });
        assert_eq!(config.llm.model, "test-model");
    }

    #[test]
    fn test_env_override_timeout() {
        let config = with_env("CODER_LLM__TIMEOUT_SECS", "15", || {
            apply_env_overrides(Config::default()).unwrap()
        });
        assert_eq!(config.llm.timeout_secs, 15);
    }

    #[test]
    fn test_env_override_bad_number_is_an_error() {
        let err = with_env("CODER_LLM__MAX_TOKENS", "lots", || {
            apply_env_overrides(Config::default()).unwrap_err()
        });
        assert_eq!(err.to_string(), "invalid value for CODER_LLM__MAX_TOKENS: 'lots'");
    }

    #[test]
    fn test_env_override_restrict() {
        let config = with_env("CODER_AGENT__RESTRICT_TO_WORKSPACE", "1", || {
            apply_env_overrides(Config::default()).unwrap()
        });
        assert!(config.agent.restrict_to_workspace);

        let err = with_env("CODER_AGENT__RESTRICT_TO_WORKSPACE", "maybe", || {
            apply_env_overrides(Config::default()).unwrap_err()
        });
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }
}
