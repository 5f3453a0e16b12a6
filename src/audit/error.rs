//! Stage-tagged errors for a full audit run.

use thiserror::Error;

use crate::audit::report::DecodeError;
use crate::audit::rubric::RubricError;
use crate::audit::transcript::TranscriptError;
use crate::llm::CompletionError;

/// Failure of [`AuditEngine`](crate::audit::AuditEngine), tagged with the
/// stage that failed. No partial report accompanies any variant.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid transcript: {0}")]
    Transcript(#[from] TranscriptError),

    #[error("invalid custom criteria: {0}")]
    Rubric(#[from] RubricError),

    #[error("completion service error: {0}")]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// How a delivery layer should present an [`AnalysisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller's input needs fixing.
    FixInput,
    /// The service failed; trying again later may work.
    RetryLater,
    /// The service answered with something unusable.
    ContactSupport,
}

impl AnalysisError {
    /// Short stage name, for logs.
    pub fn stage(&self) -> &'static str {
        match self {
            AnalysisError::Transcript(_) => "transcript",
            AnalysisError::Rubric(_) => "rubric",
            AnalysisError::Completion(_) => "completion",
            AnalysisError::Decode(_) => "decode",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalysisError::Transcript(_) | AnalysisError::Rubric(_) => ErrorCategory::FixInput,
            AnalysisError::Completion(_) => ErrorCategory::RetryLater,
            AnalysisError::Decode(_) => ErrorCategory::ContactSupport,
        }
    }

    /// Raw completion payload, when decoding was the failing stage.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            AnalysisError::Decode(e) => Some(e.raw()),
            _ => None,
        }
    }
}
