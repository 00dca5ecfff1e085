//! Filesystem tools — read, write, list directory.
//!
//! Relative paths resolve against the agent workspace. When the workspace is
//! restricted, anything resolving outside of it is refused.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use coder_core::types::ParamType;
use coder_core::utils::expand_home;
use coder_core::{ToolArguments, ToolSchema};

use super::base::{require_string, Tool};

// ─────────────────────────────────────────────
// Workspace scope
// ─────────────────────────────────────────────

/// Where filesystem tools operate.
#[derive(Debug, Clone)]
pub struct WorkspaceScope {
    root: PathBuf,
    restrict: bool,
}

impl WorkspaceScope {
    pub fn new(root: impl Into<PathBuf>, restrict: bool) -> Self {
        Self {
            root: root.into(),
            restrict,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a user-supplied path against the workspace.
    ///
    /// Returns `Err` if the workspace is restricted and the path escapes it.
    pub fn resolve(&self, path: &str) -> anyhow::Result<PathBuf> {
        let expanded = expand_home(path);
        let joined = if expanded.is_absolute() {
            expanded
        } else {
            self.root.join(expanded)
        };
        let resolved = canonicalize_lenient(&joined);

        if self.restrict {
            let root = canonicalize_lenient(&self.root);
            let has_parent_ref = resolved
                .components()
                .any(|c| matches!(c, Component::ParentDir));
            if has_parent_ref || !resolved.starts_with(&root) {
                anyhow::bail!(
                    "Access denied: path '{}' is outside workspace '{}'",
                    resolved.display(),
                    root.display()
                );
            }
        }

        Ok(resolved)
    }
}

/// Canonicalize the longest existing ancestor and re-append the rest.
///
/// Files about to be written (and their new directories) don't exist yet.
fn canonicalize_lenient(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut rest = Vec::new();
    loop {
        if let Ok(canon) = existing.canonicalize() {
            return rest.iter().rev().fold(canon, |acc, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

// ─────────────────────────────────────────────
// ReadFileTool
// ─────────────────────────────────────────────

/// Reads and returns the entire content of a file.
pub struct ReadFileTool {
    scope: WorkspaceScope,
}

impl ReadFileTool {
    pub fn new(scope: WorkspaceScope) -> Self {
        Self { scope }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            "read_file",
            "Read the contents of a file at the given path. Returns the full text content.",
        )
        .param(
            "file_path",
            ParamType::String,
            "Absolute path, or a path relative to the workspace",
        )
    }

    async fn call(&self, args: ToolArguments) -> anyhow::Result<Value> {
        let path = self.scope.resolve(&require_string(&args, "file_path")?)?;

        if !path.exists() {
            anyhow::bail!("File not found: {}", path.display());
        }
        if !path.is_file() {
            anyhow::bail!("Not a file: {}", path.display());
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        debug!(path = %path.display(), bytes = content.len(), "read file");
        Ok(Value::String(content))
    }
}

// ─────────────────────────────────────────────
// WriteFileTool
// ─────────────────────────────────────────────

/// Creates or overwrites a file with the given content.
pub struct WriteFileTool {
    scope: WorkspaceScope,
}

impl WriteFileTool {
    pub fn new(scope: WorkspaceScope) -> Self {
        Self { scope }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            "write_file",
            "Write content to a file, creating it if it doesn't exist or overwriting if it does. \
             Parent directories are created automatically.",
        )
        .param(
            "file_path",
            ParamType::String,
            "Absolute path, or a path relative to the workspace",
        )
        .param("content", ParamType::String, "Content to write to the file")
    }

    async fn call(&self, args: ToolArguments) -> anyhow::Result<Value> {
        let path = self.scope.resolve(&require_string(&args, "file_path")?)?;
        let content = require_string(&args, "content")?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!("Failed to create directory {}: {e}", parent.display())
            })?;
        }

        tokio::fs::write(&path, content.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
        Ok(json!(format!(
            "Successfully wrote {} bytes to {}",
            content.len(),
            path.display()
        )))
    }
}

// ─────────────────────────────────────────────
// ListDirTool
// ─────────────────────────────────────────────

/// Lists the contents of a directory, directories marked with a trailing `/`.
pub struct ListDirTool {
    scope: WorkspaceScope,
}

impl ListDirTool {
    pub fn new(scope: WorkspaceScope) -> Self {
        Self { scope }
    }
}

#[async_trait]
impl Tool for ListDirTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            "list_dir",
            "List the contents of a directory. Directory names end with '/'.",
        )
        .param(
            "path",
            ParamType::String,
            "Directory to list, absolute or relative to the workspace",
        )
    }

    async fn call(&self, args: ToolArguments) -> anyhow::Result<Value> {
        let path = self.scope.resolve(&require_string(&args, "path")?)?;

        if !path.is_dir() {
            anyhow::bail!("Not a directory: {}", path.display());
        }

        let mut reader = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {e}", path.display()))?;

        let mut names = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry.file_type().await.map(|ft| ft.is_dir()).unwrap_or(false);
            names.push(if is_dir { format!("{name}/") } else { name });
        }
        names.sort();

        if names.is_empty() {
            Ok(json!("(empty directory)"))
        } else {
            Ok(json!(names.join("\n")))
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
