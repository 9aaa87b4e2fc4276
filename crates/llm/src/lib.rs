//! Nexus LLM
//!
//! Provides the remote completion seam used by incident analysis:
//! - `LlmProvider` trait for any chat-completion backend
//! - OpenAI (and OpenAI-compatible gateways)
//!
//! Also includes the HTTP client factory and the shared request/response types.

pub mod http_client;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use types::*;
