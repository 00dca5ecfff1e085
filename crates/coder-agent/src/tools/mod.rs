//! Tool modules for the coding agent.

pub mod base;
pub mod filesystem;
pub mod registry;

use std::path::PathBuf;
use std::sync::Arc;

use coder_core::ToolError;

pub use base::{require_i64, require_string, stringify_output, FnTool, Tool};
pub use filesystem::{ListDirTool, ReadFileTool, WorkspaceScope, WriteFileTool};
pub use registry::ToolRegistry;

/// Registry pre-loaded with the built-in filesystem tools.
pub fn builtin_registry(workspace: impl Into<PathBuf>, restrict: bool) -> Result<ToolRegistry, ToolError> {
    let scope = WorkspaceScope::new(workspace, restrict);
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(ReadFileTool::new(scope.clone())))?;
    registry.register(Arc::new(WriteFileTool::new(scope.clone())))?;
    registry.register(Arc::new(ListDirTool::new(scope)))?;
    Ok(registry)
}
