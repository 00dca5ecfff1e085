//! Interaction orchestrator — one prompt in, one reply out.
//!
//! Each interaction records the user turn, asks the gateway whether a tool
//! fits, runs it (or asks for a direct reply instead) and records the result
//! as the assistant turn.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use coder_core::utils::truncate_string;
use coder_core::{ConversationTurn, ProviderError, ToolDecision};
use coder_providers::LlmGateway;

use crate::history::ConversationHistory;
use crate::tools::{stringify_output, ToolRegistry};

/// Prefix of the reply produced when a chosen tool fails.
pub const TOOL_ERROR_PREFIX: &str = "Error executing tool: ";

/// Characters of prompt/reply shown in log lines.
const LOG_PREVIEW_CHARS: usize = 80;

// ─────────────────────────────────────────────
// InteractionOrchestrator
// ─────────────────────────────────────────────

/// Runs user interactions against one gateway, one registry and one history.
///
/// `run_interaction` takes `&mut self`; concurrent callers must wrap the
/// orchestrator in a `tokio::sync::Mutex`.
pub struct InteractionOrchestrator {
    gateway: Arc<dyn LlmGateway>,
    registry: ToolRegistry,
    history: ConversationHistory,
    /// Upper bound for each gateway call, if any.
    timeout: Option<Duration>,
}

impl InteractionOrchestrator {
    pub fn new(gateway: Arc<dyn LlmGateway>, registry: ToolRegistry) -> Self {
        info!(
            gateway = gateway.display_name(),
            tools = registry.len(),
            "interaction orchestrator ready"
        );
        Self {
            gateway,
            registry,
            history: ConversationHistory::new(),
            timeout: None,
        }
    }

    /// Bound every gateway call by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Process one user prompt and return the assistant's reply.
    ///
    /// Tool failures are turned into a reply starting with
    /// [`TOOL_ERROR_PREFIX`]. Gateway failures are returned as errors; the
    /// user turn stays in the history in that case.
    pub async fn run_interaction(&mut self, prompt: &str) -> Result<String, ProviderError> {
        info!(prompt = %truncate_string(prompt, LOG_PREVIEW_CHARS), "interaction started");
        self.history.push_user(prompt);

        let schemas = self.registry.list_schemas();
        let decision = self
            .bounded(self.gateway.decide_tool(prompt, &schemas))
            .await?;

        let reply = match decision {
            Some(decision) => self.run_tool(decision).await,
            None => {
                debug!("no tool selected, asking for a direct reply");
                self.bounded(self.gateway.respond(prompt, self.history.turns()))
                    .await?
            }
        };

        debug!(reply = %truncate_string(&reply, LOG_PREVIEW_CHARS), "interaction finished");
        self.history.push_assistant(reply.clone());
        Ok(reply)
    }

    async fn run_tool(&self, decision: ToolDecision) -> String {
        let ToolDecision {
            tool_name,
            arguments,
        } = decision;
        info!(tool = %tool_name, "executing tool");

        match self.registry.execute(&tool_name, arguments).await {
            Ok(value) => {
                let output = stringify_output(&value);
                debug!(tool = %tool_name, result_len = output.len(), "tool result");
                output
            }
            Err(e) => {
                warn!(tool = %tool_name, error = %e, "tool failed, reporting error as reply");
                format!("{TOOL_ERROR_PREFIX}{e}")
            }
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ProviderError::Timeout(limit))?,
            None => call.await,
        }
    }

    /// All turns recorded so far, oldest first.
    pub fn history(&self) -> &[ConversationTurn] {
        self.history.turns()
    }

    /// Forget the conversation; tools stay registered.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn gateway_name(&self) -> &str {
        self.gateway.display_name()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use coder_core::types::ParamType;
    use coder_core::{Role, ToolArguments, ToolSchema};

    use crate::tools::{builtin_registry, require_string};

    /// Gateway returning canned decisions and replies, recording what it saw.
    struct MockGateway {
        decision: Option<ToolDecision>,
        reply: String,
        respond_calls: AtomicUsize,
        seen_schemas: Mutex<Vec<String>>,
        seen_history_len: Mutex<Vec<usize>>,
    }

    impl MockGateway {
        fn new(decision: Option<ToolDecision>, reply: &str) -> Self {
            Self {
                decision,
                reply: reply.to_string(),
                respond_calls: AtomicUsize::new(0),
                seen_schemas: Mutex::new(Vec::new()),
                seen_history_len: Mutex::new(Vec::new()),
            }
        }

        fn direct(reply: &str) -> Self {
            Self::new(None, reply)
        }

        fn tool(name: &str, args: Value) -> Self {
            let arguments = match args {
                Value::Object(map) => map,
                _ => ToolArguments::new(),
            };
            Self::new(Some(ToolDecision::new(name, arguments)), "unused")
        }
    }

    #[async_trait]
    impl LlmGateway for MockGateway {
        async fn decide_tool(
            &self,
            _prompt: &str,
            schemas: &[ToolSchema],
        ) -> Result<Option<ToolDecision>, ProviderError> {
            *self.seen_schemas.lock().unwrap() = schemas.iter().map(|s| s.name.clone()).collect();
            Ok(self.decision.clone())
        }

        async fn respond(
            &self,
            _prompt: &str,
            history: &[ConversationTurn],
        ) -> Result<String, ProviderError> {
            self.respond_calls.fetch_add(1, Ordering::SeqCst);
            self.seen_history_len.lock().unwrap().push(history.len());
            Ok(self.reply.clone())
        }

        fn display_name(&self) -> &str {
            "MockGateway"
        }
    }

    /// Gateway whose calls fail or hang.
    enum BrokenGateway {
        DecideFails,
        RespondFails,
        Hangs,
    }

    #[async_trait]
    impl LlmGateway for BrokenGateway {
        async fn decide_tool(
            &self,
            _prompt: &str,
            _schemas: &[ToolSchema],
        ) -> Result<Option<ToolDecision>, ProviderError> {
            match self {
                BrokenGateway::DecideFails => Err(ProviderError::Request("connection refused".into())),
                BrokenGateway::RespondFails => Ok(None),
                BrokenGateway::Hangs => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(None)
                }
            }
        }

        async fn respond(
            &self,
            _prompt: &str,
            _history: &[ConversationTurn],
        ) -> Result<String, ProviderError> {
            Err(ProviderError::EmptyResponse)
        }

        fn display_name(&self) -> &str {
            "Broken"
        }
    }

    fn read_file_registry(calls: Arc<AtomicUsize>) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        let schema = ToolSchema::new("read_file", "Read a file")
            .param("file_path", ParamType::String, "Path to read");
        registry
            .register_fn(schema, move |args: &ToolArguments| -> anyhow::Result<Value> {
                calls.fetch_add(1, Ordering::SeqCst);
                assert_eq!(require_string(args, "file_path")?, "test.py");
                Ok(json!("file content"))
            })
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_tool_path_returns_tool_output() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gateway = Arc::new(MockGateway::tool("read_file", json!({"file_path": "test.py"})));
        let mut orchestrator =
            InteractionOrchestrator::new(gateway.clone(), read_file_registry(calls.clone()));

        let reply = orchestrator.run_interaction("Read the file test.py").await.unwrap();

        assert_eq!(reply, "file content");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.respond_calls.load(Ordering::SeqCst), 0);
        assert_eq!(*gateway.seen_schemas.lock().unwrap(), vec!["read_file"]);

        let history = orchestrator.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], ConversationTurn::user("Read the file test.py"));
        assert_eq!(history[1], ConversationTurn::assistant("file content"));
    }

    #[tokio::test]
    async fn test_direct_path_skips_tools() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gateway = Arc::new(MockGateway::direct("42"));
        let mut orchestrator =
            InteractionOrchestrator::new(gateway.clone(), read_file_registry(calls.clone()));

        let reply = orchestrator
            .run_interaction("What is the meaning of life?")
            .await
            .unwrap();

        assert_eq!(reply, "42");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(gateway.respond_calls.load(Ordering::SeqCst), 1);
        // The user turn is recorded before the gateway is asked to reply.
        assert_eq!(*gateway.seen_history_len.lock().unwrap(), vec![1]);
        assert_eq!(orchestrator.history()[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_recovered() {
        let gateway = Arc::new(MockGateway::tool("broken_tool", json!({})));
        let mut orchestrator = InteractionOrchestrator::new(gateway, ToolRegistry::new());

        let reply = orchestrator.run_interaction("Use a broken tool").await.unwrap();

        assert_eq!(reply, "Error executing tool: Tool 'broken_tool' not found.");
        assert_eq!(orchestrator.history().len(), 2);
        assert_eq!(orchestrator.history()[1].content, reply);
    }

    #[tokio::test]
    async fn test_failing_tool_is_recovered() {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn(ToolSchema::new("explode", ""), |_: &ToolArguments| -> anyhow::Result<Value> {
                anyhow::bail!("disk on fire")
            })
            .unwrap();
        let gateway = Arc::new(MockGateway::tool("explode", json!({})));
        let mut orchestrator = InteractionOrchestrator::new(gateway, registry);

        let reply = orchestrator.run_interaction("go").await.unwrap();
        assert!(reply.starts_with(TOOL_ERROR_PREFIX));
        assert!(reply.contains("disk on fire"));
    }

    fn value_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn(ToolSchema::new("stats", ""), |_: &ToolArguments| -> anyhow::Result<Value> {
                Ok(json!({"files": 3}))
            })
            .unwrap();
        registry
            .register_fn(ToolSchema::new("noop", ""), |_: &ToolArguments| -> anyhow::Result<Value> {
                Ok(Value::Null)
            })
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_non_string_output_is_json_text() {
        let gateway = Arc::new(MockGateway::tool("stats", json!({})));
        let mut orchestrator = InteractionOrchestrator::new(gateway, value_registry());
        assert_eq!(orchestrator.run_interaction("count").await.unwrap(), r#"{"files":3}"#);

        let gateway = Arc::new(MockGateway::tool("noop", json!({})));
        let mut orchestrator = InteractionOrchestrator::new(gateway, value_registry());
        assert_eq!(orchestrator.run_interaction("nothing").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_history_grows_by_two_per_interaction() {
        let gateway = Arc::new(MockGateway::direct("ok"));
        let mut orchestrator = InteractionOrchestrator::new(gateway, ToolRegistry::new());

        for n in 1..=3 {
            orchestrator.run_interaction(&format!("prompt {n}")).await.unwrap();
            assert_eq!(orchestrator.history().len(), 2 * n);
        }

        let roles: Vec<Role> = orchestrator.history().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant, Role::User, Role::Assistant]
        );

        orchestrator.clear_history();
        assert!(orchestrator.history().is_empty());
    }

    #[tokio::test]
    async fn test_decide_failure_propagates() {
        let mut orchestrator =
            InteractionOrchestrator::new(Arc::new(BrokenGateway::DecideFails), ToolRegistry::new());

        let err = orchestrator.run_interaction("hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::Request(_)));
        assert_eq!(orchestrator.history(), &[ConversationTurn::user("hi")]);
    }

    #[tokio::test]
    async fn test_respond_failure_propagates() {
        let mut orchestrator =
            InteractionOrchestrator::new(Arc::new(BrokenGateway::RespondFails), ToolRegistry::new());

        let err = orchestrator.run_interaction("hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
        assert_eq!(orchestrator.history().len(), 1);
    }

    #[tokio::test]
    async fn test_gateway_timeout() {
        let mut orchestrator =
            InteractionOrchestrator::new(Arc::new(BrokenGateway::Hangs), ToolRegistry::new())
                .with_timeout(Duration::from_millis(50));

        let err = orchestrator.run_interaction("hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(d) if d == Duration::from_millis(50)));
        assert_eq!(orchestrator.history().len(), 1);
    }

    #[tokio::test]
    async fn test_builtin_read_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test.py"), "file content").unwrap();

        let registry = builtin_registry(dir.path(), true).unwrap();
        let gateway = Arc::new(MockGateway::tool("read_file", json!({"file_path": "test.py"})));
        let mut orchestrator = InteractionOrchestrator::new(gateway, registry);

        assert_eq!(orchestrator.gateway_name(), "MockGateway");
        assert_eq!(orchestrator.registry().len(), 3);
        assert_eq!(
            orchestrator.run_interaction("Read the file test.py").await.unwrap(),
            "file content"
        );
    }
}
