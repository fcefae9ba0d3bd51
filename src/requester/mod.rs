//! Analysis and prompt requests against the generative backend.
//!
//! When no provider is configured both requests are answered offline with
//! deterministic data after a short simulated delay.

mod instructions;

pub use instructions::{
    analysis_instruction, analysis_schema, energy_label, instrumentation_summary, offline_prompt,
    prompt_instruction,
};

use crate::analysis::{sample_analysis, Analysis};
use crate::llm::{
    CompletionOptions, GenerationRequest, LlmError, LlmProvider, ResponseSchema, SchemaViolation,
};
use crate::server::metrics::{record_analysis_request, record_prompt_request};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Could not generate analysis from Gemini API.")]
    Backend(#[source] LlmError),

    #[error("Could not generate analysis from Gemini API.")]
    Malformed(#[source] serde_json::Error),

    #[error("Could not generate analysis from Gemini API.")]
    Schema(#[source] SchemaViolation),
}

impl AnalysisError {
    /// Detailed cause, for logs and diagnostics.
    pub fn detail(&self) -> String {
        match self {
            AnalysisError::Backend(e) => e.to_string(),
            AnalysisError::Malformed(e) => format!("Malformed JSON: {}", e),
            AnalysisError::Schema(e) => format!("Schema violation: {}", e),
        }
    }
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Could not generate prompt from Gemini API.")]
    Backend(#[source] LlmError),

    #[error("Could not generate prompt from Gemini API.")]
    EmptyResponse,
}

#[derive(Debug, Clone)]
pub struct RequesterSettings {
    /// Simulated latency of an offline analysis.
    pub offline_analysis_delay: Duration,
    /// Simulated latency of an offline prompt.
    pub offline_prompt_delay: Duration,
    pub analysis_options: CompletionOptions,
    pub prompt_options: CompletionOptions,
}

impl Default for RequesterSettings {
    fn default() -> Self {
        Self {
            offline_analysis_delay: Duration::from_millis(1500),
            offline_prompt_delay: Duration::from_millis(1000),
            analysis_options: CompletionOptions::default(),
            prompt_options: CompletionOptions {
                temperature: Some(0.8),
                top_p: Some(0.9),
                ..Default::default()
            },
        }
    }
}

impl RequesterSettings {
    /// Settings with no simulated delays, for tests and scripting.
    pub fn immediate() -> Self {
        Self {
            offline_analysis_delay: Duration::ZERO,
            offline_prompt_delay: Duration::ZERO,
            ..Default::default()
        }
    }
}

pub struct AnalysisRequester {
    provider: Option<Arc<dyn LlmProvider>>,
    settings: RequesterSettings,
    schema: ResponseSchema,
}

impl AnalysisRequester {
    pub fn new(provider: Option<Arc<dyn LlmProvider>>, settings: RequesterSettings) -> Self {
        Self {
            provider,
            settings,
            schema: analysis_schema(),
        }
    }

    /// A requester that always answers with mock data.
    pub fn offline(settings: RequesterSettings) -> Self {
        Self::new(None, settings)
    }

    pub fn is_offline(&self) -> bool {
        self.provider.is_none()
    }

    pub fn model(&self) -> Option<&str> {
        self.provider.as_ref().map(|p| p.model())
    }

    /// Obtains a structured analysis for `source`, optionally enriched with
    /// `context` describing the linked video.
    pub async fn request_analysis(
        &self,
        source: &str,
        context: Option<&str>,
    ) -> Result<Analysis, AnalysisError> {
        let Some(provider) = &self.provider else {
            debug!(source, "No model configured, answering with sample analysis");
            tokio::time::sleep(self.settings.offline_analysis_delay).await;
            record_analysis_request("offline");
            return Ok(sample_analysis());
        };

        let start = Instant::now();
        let request = GenerationRequest::structured(
            analysis_instruction(source, context),
            self.schema.clone(),
        );

        let result = match provider
            .generate(&request, &self.settings.analysis_options)
            .await
        {
            Ok(response) => parse_analysis_response(&response.text, &self.schema),
            Err(e) => Err(AnalysisError::Backend(e)),
        };

        match &result {
            Ok(analysis) => {
                info!(
                    title = %analysis.title,
                    genre = %analysis.genre,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Analysis generated"
                );
                record_analysis_request("success");
            }
            Err(e) => {
                error!(source, error = %e.detail(), "Error calling model for analysis");
                record_analysis_request("failure");
            }
        }
        result
    }

    /// Generates a music-generator prompt describing `analysis`.
    pub async fn request_prompt(&self, analysis: &Analysis) -> Result<String, PromptError> {
        let Some(provider) = &self.provider else {
            tokio::time::sleep(self.settings.offline_prompt_delay).await;
            record_prompt_request("offline");
            return Ok(offline_prompt(analysis));
        };

        let request = GenerationRequest::text(prompt_instruction(analysis));
        let result = match provider
            .generate(&request, &self.settings.prompt_options)
            .await
        {
            Ok(response) => {
                let prompt = response.text.trim().to_string();
                if prompt.is_empty() {
                    Err(PromptError::EmptyResponse)
                } else {
                    Ok(prompt)
                }
            }
            Err(e) => Err(PromptError::Backend(e)),
        };

        match &result {
            Ok(_) => record_prompt_request("success"),
            Err(e) => {
                match e {
                    PromptError::Backend(cause) => {
                        error!(error = %cause, "Error calling model for prompt")
                    }
                    PromptError::EmptyResponse => error!("Model returned an empty prompt"),
                }
                record_prompt_request("failure");
            }
        }
        result
    }
}

/// Removes an optional Markdown code fence around a JSON payload.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = match text.strip_prefix("```json") {
        Some(rest) => rest.trim_start(),
        None => text,
    };
    text.strip_suffix("```").unwrap_or(text)
}

/// Parses and validates a raw model answer, clamping scores into [0, 1].
pub fn parse_analysis_response(
    text: &str,
    schema: &ResponseSchema,
) -> Result<Analysis, AnalysisError> {
    let value: serde_json::Value =
        serde_json::from_str(strip_code_fence(text)).map_err(AnalysisError::Malformed)?;
    schema.validate(&value).map_err(AnalysisError::Schema)?;
    let analysis: Analysis = serde_json::from_value(value).map_err(AnalysisError::Malformed)?;
    Ok(analysis.clamped())
}
