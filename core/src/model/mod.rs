//! Capability interfaces for the external AI services.
//!
//! The validator and the classifier both need "give me a score for this
//! image"; the recommendation requester needs "give me text for this
//! prompt". Each is a narrow trait so tests and alternative backends can be
//! swapped in without touching pipeline code.

pub mod deadline;
pub mod gemini;
pub mod http;
pub mod input;

use crate::error::ModelError;
use std::sync::Arc;
use std::time::Duration;

pub use deadline::call_with_deadline;
pub use gemini::GeminiClient;
pub use http::HttpScoreModel;
pub use input::ModelInput;

/// A model answering with a single score in [0, 1]
///
/// Implementations must be usable from several pipeline runs at once and
/// must not mutate shared state per call.
pub trait ScoreModel: Send + Sync {
    /// Scores one normalized image
    fn predict(&self, input: &ModelInput) -> Result<f64, ModelError>;

    /// Name used in log lines
    fn name(&self) -> &str {
        "score-model"
    }
}

/// A service turning a prompt into free text
pub trait TextGenerator: Send + Sync {
    /// Generates a response for `prompt`
    fn generate(&self, prompt: &str) -> Result<String, ModelError>;

    /// Name used in log lines
    fn name(&self) -> &str {
        "text-generator"
    }
}

/// Rejects scores that are not finite values in [0, 1]
pub fn checked_score(score: f64) -> Result<f64, ModelError> {
    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(ModelError::InvalidScore(score))
    }
}

/// Scores `input` on a worker thread, bounded by `timeout`
///
/// Out-of-range scores are reported as [`ModelError::InvalidScore`] whatever
/// the implementation returned.
pub fn predict_with_deadline(
    model: &Arc<dyn ScoreModel>,
    input: ModelInput,
    timeout: Duration,
) -> Result<f64, ModelError> {
    let model = Arc::clone(model);
    call_with_deadline(timeout, move || model.predict(&input).and_then(checked_score))
}
