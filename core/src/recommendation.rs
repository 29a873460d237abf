//! Recommendation requester.
//!
//! Packages a conclusive classification into a prompt for the language-model
//! service and relays the answer unmodified. The outbound payload holds the
//! decision label, probability and threshold and nothing else: no pixels,
//! no filename, no DICOM attributes.

use crate::error::{Result, ScreeningError};
use crate::model::{call_with_deadline, TextGenerator};
use crate::types::{ClassificationResult, RecommendationResult};
use chrono::Utc;
use log::debug;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Everything that leaves the process for a recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRequest {
    pub decision: &'static str,
    pub probability: f64,
    pub threshold: f64,
}

impl RecommendationRequest {
    /// Builds the payload, or `None` for an inconclusive classification
    pub fn from_classification(classification: &ClassificationResult) -> Option<Self> {
        classification
            .decision
            .is_conclusive()
            .then(|| Self {
                decision: classification.decision.label(),
                probability: classification.malignancy_probability,
                threshold: classification.threshold,
            })
    }
}

/// Who the recommendation is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Audience {
    #[default]
    Clinician,
    Patient,
}

/// Non-identifying context that shapes the wording of the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MinimalContext {
    pub audience: Audience,
}

impl MinimalContext {
    fn instruction(&self) -> &'static str {
        match self.audience {
            Audience::Clinician => {
                "You assist a healthcare professional reviewing an AI mammography screening \
                 result. Based only on the classifier output below, give concise next steps \
                 for clinical follow-up. State that the result must be confirmed by a \
                 radiologist."
            }
            Audience::Patient => {
                "Explain the AI mammography screening result below in plain language for a \
                 patient. Based only on the classifier output, describe sensible next steps \
                 and state that a doctor must review the result."
            }
        }
    }
}

/// Renders the prompt sent to the text generator
pub fn build_prompt(request: &RecommendationRequest, context: &MinimalContext) -> Result<String> {
    let payload = serde_json::to_string(request)?;
    Ok(format!(
        "{}\n\nClassifier output (JSON):\n{}",
        context.instruction(),
        payload
    ))
}

/// Asks the language-model service for guidance on a classification
#[derive(Clone)]
pub struct RecommendationRequester {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl RecommendationRequester {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Requests a recommendation for `classification`
    ///
    /// Returns `Ok(None)` without contacting the service when the decision
    /// is inconclusive; those cases go to human review.
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::RecommendationUnavailable`] if the service
    /// fails or does not answer within the deadline.
    pub fn request_recommendation(
        &self,
        classification: &ClassificationResult,
        context: &MinimalContext,
    ) -> Result<Option<RecommendationResult>> {
        let Some(request) = RecommendationRequest::from_classification(classification) else {
            debug!("Inconclusive classification, no recommendation requested");
            return Ok(None);
        };

        let prompt = build_prompt(&request, context)?;
        let generator = Arc::clone(&self.generator);
        let text = call_with_deadline(self.timeout, move || generator.generate(&prompt))
            .map_err(ScreeningError::RecommendationUnavailable)?;

        debug!(
            "{}: received {} chars for decision {}",
            self.generator.name(),
            text.len(),
            request.decision
        );

        Ok(Some(RecommendationResult {
            text,
            generated_at: Utc::now(),
        }))
    }
}
