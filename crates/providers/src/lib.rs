//! LLM provider adapters and registry.
//!
//! The rest of the system talks to providers only through the
//! [`traits::LlmProvider`] trait and the provider-agnostic message types in
//! `ne-domain`. Adapters translate those into each provider's wire format.

pub mod anthropic;
pub mod openai_compat;
pub mod registry;
pub mod traits;
pub mod util;

pub use registry::ProviderRegistry;
pub use traits::{ChatRequest, ChatResponse, LlmProvider, Usage};
