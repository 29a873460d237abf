use crate::error::{ErrorKind, ScreeningError};
use crate::types::{
    ClassificationResult, ImageMetadata, OutcomeStatus, RecommendationResult, ValidationResult,
};
use serde::{Deserialize, Serialize};

/// Kind and reason of the error that ended a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ScreeningError> for FailureReport {
    fn from(err: &ScreeningError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Aggregate result of one submitted image
///
/// This is the only object handed back to the caller and the only object
/// written to the audit log. It never carries pixel data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// Terminal status
    pub status: OutcomeStatus,

    /// Filename as submitted, available even when intake failed
    pub filename: String,

    /// Present once intake succeeded
    pub image: Option<ImageMetadata>,

    /// Present once the validator answered
    pub validation: Option<ValidationResult>,

    /// Present once the classifier answered
    pub classification: Option<ClassificationResult>,

    /// Present only for [`OutcomeStatus::Completed`]
    pub recommendation: Option<RecommendationResult>,

    /// Present only for [`OutcomeStatus::Failed`]
    pub failure: Option<FailureReport>,

    /// Recommendation error that was downgraded instead of failing the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_error: Option<FailureReport>,
}

impl PipelineOutcome {
    /// Outcome for a submission that failed before any stage produced a result
    pub fn failed(filename: &str, err: &ScreeningError) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            filename: filename.to_string(),
            image: None,
            validation: None,
            classification: None,
            recommendation: None,
            failure: Some(err.into()),
            recommendation_error: None,
        }
    }

    /// Returns the error kind when the run failed
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.failure.as_ref().map(|f| f.kind)
    }

    /// Whether a classification decision is available
    pub fn is_classified(&self) -> bool {
        matches!(
            self.status,
            OutcomeStatus::Classified | OutcomeStatus::Completed
        )
    }

    /// Serializes the outcome as a single JSON line
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serializes the outcome as indented JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
