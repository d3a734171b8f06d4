//! Pipeline errors

use thiserror::Error;

use super::Stage;
use crate::llm::LlmError;
use crate::plan::ExtractError;

/// Why a trip plan could not be produced
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage call failed or timed out; the pipeline aborts
    #[error("Stage '{stage}' failed: {source}")]
    StageFailure {
        stage: Stage,
        #[source]
        source: LlmError,
    },

    /// The itinerary stage answered, but its output is not a valid plan
    #[error("Plan generation failed: {0}")]
    PlanGenerationFailed(#[from] ExtractError),

    /// A prompt template could not be loaded or rendered
    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl PipelineError {
    /// The failing stage, if the error came from a stage call
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::StageFailure { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// True when the failing stage ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, PipelineError::StageFailure { source, .. } if source.is_timeout())
    }
}
