//! Coder Agent — tool registry, built-in tools, and the interaction orchestrator.
//!
//! This crate contains:
//! - **tools**: Tool trait, registry, and built-in filesystem tools
//! - **history**: per-session conversation turns
//! - **prompt**: system prompt loading
//! - **orchestrator**: one prompt → tool decision → reply

pub mod history;
pub mod orchestrator;
pub mod prompt;
pub mod tools;

pub use history::ConversationHistory;
pub use orchestrator::{InteractionOrchestrator, TOOL_ERROR_PREFIX};
pub use prompt::load_system_prompt;
pub use tools::{builtin_registry, Tool, ToolRegistry};
