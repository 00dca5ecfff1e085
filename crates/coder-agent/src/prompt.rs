//! System prompt loading.

use std::path::Path;

use tracing::{debug, error};

use coder_providers::http_provider::DEFAULT_SYSTEM_PROMPT;

/// Read the system prompt from `path`, falling back to a generic prompt.
///
/// A missing or unreadable file is logged, never fatal. Surrounding
/// whitespace is trimmed; an empty file also falls back.
pub fn load_system_prompt(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return DEFAULT_SYSTEM_PROMPT.to_string();
    };

    match std::fs::read_to_string(path) {
        Ok(content) if !content.trim().is_empty() => {
            debug!(path = %path.display(), "loaded system prompt");
            content.trim().to_string()
        }
        Ok(_) => {
            error!(path = %path.display(), "system prompt file is empty, using default prompt");
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "could not read system prompt, using default prompt");
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_path_uses_default() {
        assert_eq!(load_system_prompt(None), DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_missing_file_uses_default() {
        let prompt = load_system_prompt(Some(Path::new("/nonexistent/coder/prompt.txt")));
        assert_eq!(prompt, "You are a helpful AI assistant.");
    }

    #[test]
    fn test_reads_and_trims_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("system_prompt.txt");
        std::fs::write(&path, "\nYou are a careful Rust reviewer.\n\n").unwrap();
        assert_eq!(
            load_system_prompt(Some(&path)),
            "You are a careful Rust reviewer."
        );
    }

    #[test]
    fn test_empty_file_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "   \n").unwrap();
        assert_eq!(load_system_prompt(Some(&path)), DEFAULT_SYSTEM_PROMPT);
    }
}
