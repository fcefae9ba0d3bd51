//! Common types for LLM interactions.

use super::schema::ResponseSchema;

/// A single-turn generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Natural-language instruction sent to the model.
    pub prompt: String,
    /// When set, the model must answer with JSON matching this schema.
    pub response_schema: Option<ResponseSchema>,
}

impl GenerationRequest {
    /// Create a free-text request.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_schema: None,
        }
    }

    /// Create a request constrained to structured JSON output.
    pub fn structured(prompt: impl Into<String>, schema: ResponseSchema) -> Self {
        Self {
            prompt: prompt.into(),
            response_schema: Some(schema),
        }
    }

    pub fn is_structured(&self) -> bool {
        self.response_schema.is_some()
    }
}

/// Response from an LLM generation request.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The generated text.
    pub text: String,
    /// Why the generation finished.
    pub finish_reason: FinishReason,
    /// Token usage information (if available).
    pub usage: Option<TokenUsage>,
}

/// Why an LLM generation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Natural end of response.
    Stop,
    /// Hit the maximum token limit.
    MaxTokens,
    /// Blocked by the backend's safety filters.
    Safety,
    /// Anything else the backend reports.
    Other,
}

/// Token usage information.
#[derive(Debug, Clone, Copy)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
