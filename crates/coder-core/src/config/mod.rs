//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use coder_core::config;
//!
//! # fn main() -> Result<(), coder_core::ConfigError> {
//! let cfg = config::load_config(None)?;
//! println!("Model: {}", cfg.llm.model);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{AgentConfig, Config, LlmConfig, LoggingConfig};
