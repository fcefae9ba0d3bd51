//! The coordinator owning the current analysis and variation parameters.
//!
//! State is only ever replaced wholesale. Each analysis request is tagged with
//! a sequence number, and a completion is adopted only while its number is
//! still the latest one, so a slow earlier request can never overwrite a newer
//! result.

use crate::analysis::{
    apply_variation_to_result, Analysis, AnalysisResult, VariationError, VariationParams,
};
use crate::metadata::{enrichment_context, MetadataFetcher};
use crate::requester::{AnalysisError, AnalysisRequester, PromptError};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please provide a YouTube link or an audio file name.")]
    EmptySource,

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Analysis request {sequence} was superseded by a newer request")]
    Superseded { sequence: u64 },

    #[error(transparent)]
    InvalidVariation(#[from] VariationError),

    #[error("No analysis is available yet")]
    NoAnalysis,

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

#[derive(Debug, Clone, Default)]
struct SessionState {
    latest_sequence: u64,
    loading: bool,
    result: Option<AnalysisResult>,
    params: VariationParams,
    error: Option<String>,
}

/// What a client sees of the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub loading: bool,
    /// The current analysis with the variation parameters applied.
    pub result: Option<AnalysisResult>,
    /// The analysis as returned by the requester.
    pub base: Option<AnalysisResult>,
    pub params: VariationParams,
    pub error: Option<String>,
}

pub struct AnalysisSession {
    requester: Arc<AnalysisRequester>,
    metadata: Option<Arc<dyn MetadataFetcher>>,
    state: Mutex<SessionState>,
}

impl AnalysisSession {
    /// `metadata` is used to enrich link sources; `None` disables enrichment.
    pub fn new(
        requester: Arc<AnalysisRequester>,
        metadata: Option<Arc<dyn MetadataFetcher>>,
    ) -> Self {
        Self {
            requester,
            metadata,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        // State is replaced wholesale, so a poisoned lock still holds a consistent value.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Starts a new analysis of `source`, resetting variation parameters.
    ///
    /// Returns the varied result (identical to the base one, since params were
    /// just reset) or [`SessionError::Superseded`] when a newer request started
    /// before this one finished.
    pub async fn analyze(&self, source: &str) -> Result<AnalysisResult, SessionError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(SessionError::EmptySource);
        }

        let sequence = self.begin_analysis();
        info!(sequence, source, "Starting analysis");

        let context = match &self.metadata {
            Some(fetcher) => enrichment_context(source, fetcher.as_ref()).await,
            None => None,
        };
        let outcome = self
            .requester
            .request_analysis(source, context.as_deref())
            .await;

        self.complete_analysis(sequence, source, outcome)
    }

    /// Takes the next sequence number and installs the loading state under a
    /// single lock, so the latest number is always the one in state.
    fn begin_analysis(&self) -> u64 {
        let mut state = self.lock_state();
        let sequence = state.latest_sequence + 1;
        *state = SessionState {
            latest_sequence: sequence,
            loading: true,
            ..SessionState::default()
        };
        sequence
    }

    fn complete_analysis(
        &self,
        sequence: u64,
        source: &str,
        outcome: Result<Analysis, AnalysisError>,
    ) -> Result<AnalysisResult, SessionError> {
        let mut state = self.lock_state();
        if state.latest_sequence != sequence {
            warn!(
                sequence,
                latest = state.latest_sequence,
                "Discarding stale analysis response"
            );
            return Err(SessionError::Superseded { sequence });
        }

        match outcome {
            Ok(analysis) => {
                let result = AnalysisResult::new(source, analysis);
                *state = SessionState {
                    latest_sequence: sequence,
                    loading: false,
                    result: Some(result.clone()),
                    params: VariationParams::default(),
                    error: None,
                };
                Ok(result)
            }
            Err(e) => {
                *state = SessionState {
                    latest_sequence: sequence,
                    loading: false,
                    result: None,
                    params: VariationParams::default(),
                    error: Some(e.to_string()),
                };
                Err(e.into())
            }
        }
    }

    /// Replaces the variation parameters, returning the new snapshot.
    pub fn set_variation(&self, params: VariationParams) -> Result<SessionSnapshot, SessionError> {
        params.validate()?;
        let mut state = self.lock_state();
        debug!(?params, "Variation parameters changed");
        state.params = params;
        Ok(snapshot_of(&state))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        snapshot_of(&self.lock_state())
    }

    /// The current analysis with variations applied, if any.
    pub fn varied_result(&self) -> Option<AnalysisResult> {
        self.snapshot().result
    }

    /// Generates a prompt for the current varied analysis.
    ///
    /// Failures are reported to the caller only; the analysis state is not
    /// touched.
    pub async fn generate_prompt(&self) -> Result<String, SessionError> {
        let varied = self.varied_result().ok_or(SessionError::NoAnalysis)?;
        Ok(self.requester.request_prompt(&varied.analysis).await?)
    }
}

fn snapshot_of(state: &SessionState) -> SessionSnapshot {
    SessionSnapshot {
        loading: state.loading,
        result: state
            .result
            .as_ref()
            .map(|base| apply_variation_to_result(base, &state.params)),
        base: state.result.clone(),
        params: state.params,
        error: state.error.clone(),
    }
}
