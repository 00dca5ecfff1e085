//! LLM gateway layer for the local coding agent.
//!
//! # Architecture
//!
//! - [`traits::LlmGateway`] — capability trait: decide on a tool, or respond directly
//! - [`registry`] — static specs for the supported OpenAI-compatible backends
//! - [`http_provider::HttpGateway`] — HTTP client for any `/chat/completions` endpoint
//! - [`http_provider::create_gateway`] — builder from the `llm` config section

pub mod http_provider;
pub mod registry;
pub mod traits;

pub use http_provider::{create_gateway, HttpGateway};
pub use registry::{ProviderSpec, PROVIDERS};
pub use traits::{LlmGateway, LlmRequestConfig};
