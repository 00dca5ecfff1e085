//! HTTP gateway for OpenAI-compatible chat completion APIs.
//!
//! One `/chat/completions` request per gateway call, no retries.
//! `decide_tool` offers the registered tools with `tool_choice: "auto"` and
//! reads back the first tool call; `respond` sends the conversation without
//! tools and returns the assistant's text.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

use coder_core::config::LlmConfig;
use coder_core::types::{
    AssistantMessage, ChatCompletionRequest, ChatCompletionResponse, Message, ToolDefinition,
};
use coder_core::{ConversationTurn, ProviderError, ToolArguments, ToolDecision, ToolSchema};

use crate::registry::{find_by_name, resolve_api_key, ProviderSpec};
use crate::traits::{LlmGateway, LlmRequestConfig};

/// System prompt used when none is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// HTTP client timeout when the config leaves it at 0.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

// ─────────────────────────────────────────────
// HttpGateway
// ─────────────────────────────────────────────

/// An `LlmGateway` that talks to any OpenAI-compatible HTTP API.
pub struct HttpGateway {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    /// Model sent with every request.
    model: String,
    system_prompt: String,
    request_config: LlmRequestConfig,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("provider", &self.spec.display_name)
            .finish()
    }
}

impl HttpGateway {
    /// Create a gateway for `spec`.
    ///
    /// `api_base` overrides the spec's default endpoint.
    pub fn new(
        spec: &'static ProviderSpec,
        api_base: Option<&str>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        request_config: LlmRequestConfig,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let api_base = api_base.unwrap_or(spec.default_api_base).to_string();

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(HttpGateway {
            client,
            api_base,
            api_key: api_key.into(),
            model: model.into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            request_config,
            spec,
        })
    }

    /// Replace the system prompt sent as the first message of every request.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    fn build_request(
        &self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            tool_choice: tools.as_ref().map(|_| "auto".to_string()),
            tools,
            max_tokens: Some(self.request_config.max_tokens),
            temperature: Some(self.request_config.temperature),
        }
    }

    /// Send one request and return the first choice's message.
    async fn send(&self, request: &ChatCompletionRequest) -> Result<AssistantMessage, ProviderError> {
        debug!(
            provider = self.spec.display_name,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map_or(0, |t| t.len()),
            "Calling LLM"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = self.spec.display_name, error = %e, "HTTP request failed");
                ProviderError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(
                provider = self.spec.display_name,
                status = %status,
                body = %body,
                "API error"
            );
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat_resp: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(provider = self.spec.display_name, error = %e, "Failed to parse LLM response");
            ProviderError::InvalidResponse(e.to_string())
        })?;

        let choice = chat_resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".into()))?;

        debug!(
            provider = self.spec.display_name,
            has_content = choice.message.content.is_some(),
            tool_calls = choice.message.tool_calls.as_ref().map_or(0, |t| t.len()),
            finish_reason = choice.finish_reason.as_deref().unwrap_or("?"),
            "LLM response received"
        );

        Ok(choice.message)
    }
}

/// Parse the JSON-encoded `arguments` string of a tool call.
fn parse_arguments(raw: &str) -> Result<ToolArguments, ProviderError> {
    if raw.trim().is_empty() {
        return Ok(ToolArguments::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ProviderError::InvalidResponse(format!(
            "tool arguments must be a JSON object, got: {other}"
        ))),
        Err(e) => Err(ProviderError::InvalidResponse(format!(
            "tool arguments are not valid JSON: {e}"
        ))),
    }
}

#[async_trait]
impl LlmGateway for HttpGateway {
    async fn decide_tool(
        &self,
        prompt: &str,
        schemas: &[ToolSchema],
    ) -> Result<Option<ToolDecision>, ProviderError> {
        if schemas.is_empty() {
            return Ok(None);
        }

        let messages = vec![Message::system(&self.system_prompt), Message::user(prompt)];
        let tools: Vec<ToolDefinition> = schemas.iter().map(ToolSchema::to_definition).collect();
        let message = self.send(&self.build_request(messages, Some(tools))).await?;

        let mut calls = message.tool_calls.unwrap_or_default().into_iter();
        let Some(call) = calls.next() else {
            return Ok(None);
        };
        let ignored = calls.count();
        if ignored > 0 {
            debug!(ignored, "LLM requested several tools, using the first");
        }

        let arguments = parse_arguments(&call.function.arguments)?;
        Ok(Some(ToolDecision::new(call.function.name, arguments)))
    }

    async fn respond(
        &self,
        prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(&self.system_prompt));
        messages.extend(history.iter().map(Message::from));
        // The orchestrator records the prompt before asking, so it is usually
        // already the last turn.
        let prompt_recorded = history
            .last()
            .is_some_and(|t| *t == ConversationTurn::user(prompt));
        if !prompt_recorded {
            messages.push(Message::user(prompt));
        }

        let message = self.send(&self.build_request(messages, None)).await?;

        message
            .content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }

    fn display_name(&self) -> &str {
        self.spec.display_name
    }
}

// ─────────────────────────────────────────────
// Builder (convenience)
// ─────────────────────────────────────────────

/// Build an `HttpGateway` from the `llm` config section.
pub fn create_gateway(config: &LlmConfig) -> Result<HttpGateway, ProviderError> {
    let spec = find_by_name(&config.provider).ok_or_else(|| {
        ProviderError::Config(format!("Unsupported LLM provider: {}", config.provider))
    })?;
    let api_key = resolve_api_key(&config.api_key, spec)?;

    let timeout_secs = if config.timeout_secs == 0 {
        DEFAULT_HTTP_TIMEOUT_SECS
    } else {
        config.timeout_secs
    };

    let request_config = LlmRequestConfig {
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    };

    let gateway = HttpGateway::new(
        spec,
        config.api_base.as_deref(),
        api_key,
        &config.model,
        request_config,
        Duration::from_secs(timeout_secs),
    )?;

    info!(
        provider = spec.display_name,
        model = %config.model,
        api_base = %gateway.api_base,
        "Initialized LLM gateway"
    );

    Ok(gateway)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
