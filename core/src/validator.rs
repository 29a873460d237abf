//! AI mammography validator.
//!
//! The plausibility judgement belongs to the model. This stage only builds
//! the model input, applies the caller's threshold to the returned
//! confidence, and keeps "validator down" apart from "image rejected".

use crate::error::{Result, ScreeningError};
use crate::model::{predict_with_deadline, ModelInput, ScoreModel};
use crate::types::{ImageRecord, ValidationResult};
use log::debug;
use std::sync::Arc;
use std::time::Duration;

/// Decides whether an image is plausibly a mammogram
#[derive(Clone)]
pub struct ImageValidator {
    model: Arc<dyn ScoreModel>,
    input_size: u32,
    timeout: Duration,
}

impl ImageValidator {
    pub fn new(model: Arc<dyn ScoreModel>, input_size: u32, timeout: Duration) -> Self {
        Self {
            model,
            input_size,
            timeout,
        }
    }

    /// Scores `record` and applies `confidence >= threshold`
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::ValidatorUnavailable`] if the model fails,
    /// times out, or answers with an out-of-range score. A low score is not
    /// an error: it yields a negative [`ValidationResult`].
    pub fn validate(&self, record: &ImageRecord, threshold: f64) -> Result<ValidationResult> {
        let input = ModelInput::from_image(record.pixels(), self.input_size);
        let confidence = predict_with_deadline(&self.model, input, self.timeout)
            .map_err(ScreeningError::ValidatorUnavailable)?;

        let result = ValidationResult::from_confidence(confidence, threshold);
        debug!(
            "{}: {} mammography confidence {:.3} (threshold {:.2}) -> {}",
            self.model.name(),
            record.filename(),
            confidence,
            threshold,
            if result.is_valid_mammogram { "valid" } else { "rejected" }
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ModelError};
    use crate::testing::{record, FailingModel, FixedScore, SlowModel};
    use crate::types::RejectionReason;

    fn validator(model: Arc<dyn ScoreModel>) -> ImageValidator {
        ImageValidator::new(model, 32, Duration::from_secs(5))
    }

    #[test]
    fn test_confident_model_accepts() {
        let result = validator(FixedScore::shared(0.93))
            .validate(&record(), 0.75)
            .unwrap();
        assert!(result.is_valid_mammogram);
        assert_eq!(result.confidence, 0.93);
        assert_eq!(result.rejection_reason, None);
    }

    #[test]
    fn test_low_confidence_rejects() {
        let result = validator(FixedScore::shared(0.2))
            .validate(&record(), 0.75)
            .unwrap();
        assert!(!result.is_valid_mammogram);
        assert_eq!(
            result.rejection_reason,
            Some(RejectionReason::LowMammographyConfidence)
        );
    }

    #[test]
    fn test_threshold_is_caller_supplied() {
        let v = validator(FixedScore::shared(0.6));
        assert!(!v.validate(&record(), 0.75).unwrap().is_valid_mammogram);
        assert!(v.validate(&record(), 0.5).unwrap().is_valid_mammogram);
    }

    #[test]
    fn test_outage_is_not_a_rejection() {
        let err = validator(FailingModel::shared("connection refused"))
            .validate(&record(), 0.75)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidatorUnavailable);
    }

    #[test]
    fn test_invalid_score_is_unavailable() {
        let err = validator(FixedScore::shared(1.7))
            .validate(&record(), 0.75)
            .unwrap_err();
        assert!(matches!(
            err,
            ScreeningError::ValidatorUnavailable(ModelError::InvalidScore(_))
        ));
    }

    #[test]
    fn test_timeout_is_unavailable() {
        let v = ImageValidator::new(
            SlowModel::shared(Duration::from_secs(2), 0.9),
            32,
            Duration::from_millis(50),
        );
        let err = v.validate(&record(), 0.75).unwrap_err();
        assert!(matches!(
            err,
            ScreeningError::ValidatorUnavailable(ModelError::Timeout(_))
        ));
    }
}
