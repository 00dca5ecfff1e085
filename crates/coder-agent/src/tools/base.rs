//! Tool trait — the interface every agent tool implements.

use async_trait::async_trait;
use serde_json::Value;

use coder_core::{ToolArguments, ToolSchema};

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every agent tool implements this trait.
///
/// The registry validates `schema()` at registration, checks incoming
/// arguments against it, and only then calls `call()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description, and parameters shown to the LLM.
    fn schema(&self) -> ToolSchema;

    /// Run the tool with already-validated named arguments.
    ///
    /// Any JSON value may be returned; the orchestrator turns it into text.
    async fn call(&self, args: ToolArguments) -> anyhow::Result<Value>;
}

// ─────────────────────────────────────────────
// Closure-backed tool
// ─────────────────────────────────────────────

/// A tool made from a schema and a plain synchronous closure.
pub struct FnTool<F> {
    schema: ToolSchema,
    func: F,
}

impl<F> FnTool<F>
where
    F: Fn(&ToolArguments) -> anyhow::Result<Value> + Send + Sync,
{
    pub fn new(schema: ToolSchema, func: F) -> Self {
        Self { schema, func }
    }
}

#[async_trait]
impl<F> Tool for FnTool<F>
where
    F: Fn(&ToolArguments) -> anyhow::Result<Value> + Send + Sync,
{
    fn schema(&self) -> ToolSchema {
        self.schema.clone()
    }

    async fn call(&self, args: ToolArguments) -> anyhow::Result<Value> {
        (self.func)(&args)
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required `String` param, returning a user-friendly error.
pub fn require_string(params: &ToolArguments, key: &str) -> anyhow::Result<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))
}

/// Extract a required integer param. Integral floats (`5.0`) are accepted.
pub fn require_i64(params: &ToolArguments, key: &str) -> anyhow::Result<i64> {
    let value = params
        .get(key)
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))?;
    value
        .as_i64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        })
        .ok_or_else(|| anyhow::anyhow!("Parameter '{key}' must be an integer"))
}

/// Render a tool result as the text recorded in the conversation.
///
/// Strings are used as-is, `null` becomes empty, anything else is compact JSON.
pub fn stringify_output(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
