//! LLM gateway trait — the capability interface the orchestrator depends on.
//!
//! The orchestrator only ever holds an `Arc<dyn LlmGateway>`; `HttpGateway`
//! is the production implementation and tests substitute their own.

use async_trait::async_trait;
use coder_core::{ConversationTurn, ProviderError, ToolDecision, ToolSchema};

/// Configuration passed to each LLM call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.1,
        }
    }
}

/// The two things the agent needs from a language model.
///
/// Both calls may block on the network and fail with a `ProviderError`.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Decide whether `prompt` calls for one of `schemas`.
    ///
    /// Returns `Ok(None)` when no tool is needed.
    async fn decide_tool(
        &self,
        prompt: &str,
        schemas: &[ToolSchema],
    ) -> Result<Option<ToolDecision>, ProviderError>;

    /// Produce a direct textual answer to `prompt` given the conversation so far.
    async fn respond(
        &self,
        prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<String, ProviderError>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
