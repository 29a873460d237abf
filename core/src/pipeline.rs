//! Pipeline orchestrator.
//!
//! Sequences intake → validator → classifier → recommendation for one
//! submitted image and folds the stage results into a [`PipelineOutcome`].
//! All judgement lives in the stages; this module only decides whether to
//! continue.
//!
//! ```text
//! Intaken ─┬─> Validated ─┬─> Classified ─┬─> Completed
//!          │              │               └─> Classified   (inconclusive or
//!          └─> Rejected   └─> ClassifierFailed              recommendation down)
//! ```

use crate::classifier::Classifier;
use crate::context::PipelineContext;
use crate::error::{ErrorKind, Result};
use crate::intake::Intake;
use crate::recommendation::RecommendationRequester;
use crate::types::{OutcomeStatus, PipelineOutcome};
use crate::validator::ImageValidator;
use log::{debug, error, info, warn};
use std::fmt;
use std::sync::Arc;

/// Log target of the per-outcome audit line
pub const AUDIT_TARGET: &str = "mammoscreen::audit";

/// Intermediate states of a pipeline run, used for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Intaken,
    Validated,
    Rejected,
    Classified,
    ClassifierFailed,
    Completed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Intaken => "intaken",
            PipelineStage::Validated => "validated",
            PipelineStage::Rejected => "rejected",
            PipelineStage::Classified => "classified",
            PipelineStage::ClassifierFailed => "classifier-failed",
            PipelineStage::Completed => "completed",
        };
        write!(f, "{}", name)
    }
}

/// Screening pipeline over a shared read-only context
///
/// Cloning is cheap and every clone shares the same context. `submit` keeps
/// all per-run state on its own stack, so concurrent calls never observe
/// each other.
#[derive(Clone)]
pub struct ScreeningPipeline {
    context: Arc<PipelineContext>,
    intake: Intake,
    validator: ImageValidator,
    classifier: Classifier,
    requester: RecommendationRequester,
}

impl ScreeningPipeline {
    pub fn new(context: PipelineContext) -> Self {
        let config = &context.config;
        let timeout = config.call_timeout();
        let intake = Intake::new(config);
        let validator = ImageValidator::new(
            Arc::clone(&context.validator_model),
            config.model_input_size,
            timeout,
        );
        let classifier = Classifier::new(
            Arc::clone(&context.classifier_model),
            config.model_input_size,
            timeout,
        );
        let requester = RecommendationRequester::new(Arc::clone(&context.generator), timeout);

        Self {
            context: Arc::new(context),
            intake,
            validator,
            classifier,
            requester,
        }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Runs one uploaded image through every stage
    ///
    /// Never fails: errors are reported inside the outcome with status
    /// [`OutcomeStatus::Failed`] and a [`crate::types::FailureReport`].
    pub fn submit(&self, bytes: &[u8], filename: &str) -> PipelineOutcome {
        let mut outcome = PipelineOutcome {
            status: OutcomeStatus::Failed,
            filename: filename.to_string(),
            image: None,
            validation: None,
            classification: None,
            recommendation: None,
            failure: None,
            recommendation_error: None,
        };

        match self.run(bytes, filename, &mut outcome) {
            Ok(status) => outcome.status = status,
            Err(e) => {
                error!("{}: {} ({})", filename, e, e.kind());
                outcome.status = OutcomeStatus::Failed;
                outcome.failure = Some((&e).into());
            }
        }

        info!("{}: {}", filename, outcome.status);
        audit(&outcome);
        outcome
    }

    fn run(
        &self,
        bytes: &[u8],
        filename: &str,
        outcome: &mut PipelineOutcome,
    ) -> Result<OutcomeStatus> {
        let config = &self.context.config;

        let record = self.intake.ingest(bytes, filename)?;
        outcome.image = Some(record.metadata().clone());
        trace(filename, PipelineStage::Intaken);

        let validation = self
            .validator
            .validate(&record, config.validation_threshold)?;
        let accepted = validation.is_valid_mammogram;
        outcome.validation = Some(validation);
        if !accepted {
            trace(filename, PipelineStage::Rejected);
            warn!("{}: rejected by validator", filename);
            return Ok(OutcomeStatus::Rejected);
        }
        trace(filename, PipelineStage::Validated);

        let classification = self
            .classifier
            .classify(
                &record,
                config.confidence_threshold,
                config.indeterminate_margin,
            )
            .inspect_err(|_| trace(filename, PipelineStage::ClassifierFailed))?;
        // Pixels are not needed past classification
        drop(record);
        trace(filename, PipelineStage::Classified);

        let recommendation = self
            .requester
            .request_recommendation(&classification, &self.context.recommendation_context);
        outcome.classification = Some(classification);

        match recommendation {
            Ok(Some(recommendation)) => {
                outcome.recommendation = Some(recommendation);
                trace(filename, PipelineStage::Completed);
                Ok(OutcomeStatus::Completed)
            }
            Ok(None) => Ok(OutcomeStatus::Classified),
            Err(e) if e.kind() == ErrorKind::RecommendationUnavailable => {
                warn!("{}: {}; reporting classification only", filename, e);
                outcome.recommendation_error = Some((&e).into());
                Ok(OutcomeStatus::Classified)
            }
            Err(e) => Err(e),
        }
    }
}

fn trace(filename: &str, stage: PipelineStage) {
    debug!("{}: -> {}", filename, stage);
}

fn audit(outcome: &PipelineOutcome) {
    match outcome.to_json() {
        Ok(json) => info!(target: AUDIT_TARGET, "{}", json),
        Err(e) => error!(target: AUDIT_TARGET, "failed to serialize outcome: {}", e),
    }
}

/// Builds a pipeline and runs a single submission
///
/// Convenience for one-shot callers; long-lived callers should keep a
/// [`ScreeningPipeline`] and call [`ScreeningPipeline::submit`].
pub fn submit_once(
    context: PipelineContext,
    bytes: &[u8],
    filename: &str,
) -> Result<PipelineOutcome> {
    context.config.validate()?;
    Ok(ScreeningPipeline::new(context).submit(bytes, filename))
}
