//! Incident Responder LLM
//!
//! Provides a unified interface for the model-calling layer:
//! - Conversation types (`Message`, `ToolDefinition`, `ToolCall`, `LlmResponse`)
//! - The `LlmProvider` trait
//! - An OpenAI-compatible chat-completions provider (OpenAI, Ollama `/v1`, vLLM)
//!
//! Also includes the HTTP client factory.

pub mod http_client;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use types::*;
