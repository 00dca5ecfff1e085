//! Core crate for the local coding agent.
//!
//! Shared types (conversation turns, tool schemas, tool decisions, chat wire
//! format), error enums, configuration, and small path/string utilities.

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use error::{ConfigError, ProviderError, ToolError};
pub use types::{ConversationTurn, Role, ToolArguments, ToolDecision, ToolSchema};
