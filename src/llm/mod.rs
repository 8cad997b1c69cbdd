//! LLM module - Language Model integrations
//!
//! Provides the provider abstraction and the Gemini backend.

pub mod gemini;
pub mod traits;

pub use gemini::GeminiClient;
pub use traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};
