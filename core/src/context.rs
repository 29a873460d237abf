use crate::error::Result;
use crate::model::{GeminiClient, HttpScoreModel, ScoreModel, TextGenerator};
use crate::recommendation::MinimalContext;
use crate::types::{PipelineConfig, ServiceConfig};
use log::info;
use std::sync::Arc;

/// Read-only resources shared by every pipeline run
///
/// Built once at process start and never mutated afterwards, so any number
/// of runs may borrow it concurrently. Model handles are trait objects,
/// which lets tests pass deterministic fakes.
#[derive(Clone)]
pub struct PipelineContext {
    pub(crate) config: PipelineConfig,
    pub(crate) validator_model: Arc<dyn ScoreModel>,
    pub(crate) classifier_model: Arc<dyn ScoreModel>,
    pub(crate) generator: Arc<dyn TextGenerator>,
    pub(crate) recommendation_context: MinimalContext,
}

impl PipelineContext {
    /// Creates a context from already-constructed model handles
    ///
    /// # Errors
    ///
    /// Returns [`crate::ScreeningError::Config`] if `config` fails validation.
    pub fn new(
        config: PipelineConfig,
        validator_model: Arc<dyn ScoreModel>,
        classifier_model: Arc<dyn ScoreModel>,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            validator_model,
            classifier_model,
            generator,
            recommendation_context: MinimalContext::default(),
        })
    }

    /// Creates a context talking to the configured HTTP endpoints and Gemini
    pub fn from_services(config: PipelineConfig, services: &ServiceConfig) -> Result<Self> {
        let timeout = config.call_timeout();
        let validator = HttpScoreModel::new("validator", &services.validator_url, timeout)?;
        let classifier = HttpScoreModel::new("classifier", &services.classifier_url, timeout)?;
        let gemini = GeminiClient::new(services, timeout)?;

        info!(
            "Validator endpoint: {}, classifier endpoint: {}, recommendation model: {}",
            validator.url(),
            classifier.url(),
            services.gemini_model
        );

        Self::new(
            config,
            Arc::new(validator),
            Arc::new(classifier),
            Arc::new(gemini),
        )
    }

    /// Sets the context attached to recommendation requests
    pub fn with_recommendation_context(mut self, context: MinimalContext) -> Self {
        self.recommendation_context = context;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScreeningError;
    use crate::recommendation::Audience;
    use crate::testing::{FixedScore, SpyGenerator};

    #[test]
    fn test_new_validates_config() {
        let config = PipelineConfig::default().with_indeterminate_margin(0.0);
        let result = PipelineContext::new(
            config,
            FixedScore::shared(0.9),
            FixedScore::shared(0.1),
            SpyGenerator::answering("ok"),
        );
        assert!(matches!(result, Err(ScreeningError::Config(_))));
    }

    #[test]
    fn test_with_recommendation_context() {
        let ctx = PipelineContext::new(
            PipelineConfig::default(),
            FixedScore::shared(0.9),
            FixedScore::shared(0.1),
            SpyGenerator::answering("ok"),
        )
        .unwrap()
        .with_recommendation_context(MinimalContext {
            audience: Audience::Patient,
        });
        assert_eq!(ctx.recommendation_context.audience, Audience::Patient);
        assert_eq!(ctx.config().confidence_threshold, 0.75);
    }

    #[test]
    fn test_from_services_requires_api_key() {
        let services = ServiceConfig::new(
            "http://127.0.0.1:9/validate".to_string(),
            "http://127.0.0.1:9/classify".to_string(),
            String::new(),
        );
        let result = PipelineContext::from_services(PipelineConfig::default(), &services);
        assert!(matches!(result, Err(ScreeningError::Config(_))));
    }
}
