//! Tool Registry — ordered store of tools and their schemas.
//!
//! Each entry keeps the tool and its validated schema together, so the schema
//! list handed to the LLM can never drift from what is executable.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use coder_core::types::ToolDefinition;
use coder_core::{ToolArguments, ToolError, ToolSchema};

use super::base::{FnTool, Tool};

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// A registered tool together with the schema it was validated against.
struct ToolEntry {
    tool: Arc<dyn Tool>,
    schema: ToolSchema,
}

/// Stores tools in registration order and dispatches calls by name.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<ToolEntry>,
    /// Tool name → position in `entries`.
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under the name in its schema.
    ///
    /// An invalid schema leaves the registry untouched. Registering a name
    /// that already exists replaces the old tool in its original position.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let schema = tool.schema();
        schema.validate()?;

        let name = schema.name.clone();
        let entry = ToolEntry { tool, schema };
        match self.index.get(&name) {
            Some(&pos) => {
                warn!(tool = %name, "replacing previously registered tool");
                self.entries[pos] = entry;
            }
            None => {
                info!(tool = %name, "registered tool");
                self.index.insert(name, self.entries.len());
                self.entries.push(entry);
            }
        }
        Ok(())
    }

    /// Register a plain closure under `schema`.
    pub fn register_fn<F>(&mut self, schema: ToolSchema, func: F) -> Result<(), ToolError>
    where
        F: Fn(&ToolArguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnTool::new(schema, func)))
    }

    /// Register a closure whose schema is given in OpenAI function-tool JSON.
    pub fn register_json<F>(&mut self, schema: &Value, func: F) -> Result<(), ToolError>
    where
        F: Fn(&ToolArguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let schema = ToolSchema::from_json(schema)?;
        self.register_fn(schema, func)
    }

    /// All schemas, in registration order.
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.entries.iter().map(|e| e.schema.clone()).collect()
    }

    /// All schemas in the wire format sent to the LLM.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.entries.iter().map(|e| e.schema.to_definition()).collect()
    }

    pub fn get_schema(&self, name: &str) -> Option<&ToolSchema> {
        self.index.get(name).map(|&pos| &self.entries[pos].schema)
    }

    /// Check if a tool is registered.
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names of all registered tools, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.schema.name.clone()).collect()
    }

    /// Execute a tool by name.
    ///
    /// Arguments are checked against the schema first. Failures in the tool
    /// body come back as `ToolError::Execution` wrapping the original error.
    pub async fn execute(&self, name: &str, arguments: ToolArguments) -> Result<Value, ToolError> {
        let entry = match self.index.get(name) {
            Some(&pos) => &self.entries[pos],
            None => {
                warn!(tool = name, "tool not found");
                return Err(ToolError::NotFound(name.to_string()));
            }
        };

        entry
            .schema
            .check_arguments(&arguments)
            .map_err(|reason| ToolError::execution(name, reason))?;

        debug!(tool = name, args = arguments.len(), "executing tool");
        entry.tool.call(arguments).await.map_err(|e| {
            warn!(tool = name, error = %e, "tool execution failed");
            ToolError::execution(name, e)
        })
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
