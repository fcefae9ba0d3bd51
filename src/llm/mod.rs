//! LLM provider abstraction layer.
//!
//! This module provides a trait-based abstraction for generative model
//! backends, so the requesters can work against Gemini or a test double.

mod gemini;
mod provider;
mod schema;
mod types;

pub use gemini::{GeminiProvider, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use schema::{ResponseSchema, SchemaType, SchemaViolation};
pub use types::{CompletionResponse, FinishReason, GenerationRequest, TokenUsage};
