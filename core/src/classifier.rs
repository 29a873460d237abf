//! Malignancy classifier.
//!
//! The model supplies a probability; the decision is deterministic
//! post-processing of that probability with a threshold and an
//! indeterminate margin (see [`Decision::from_probability`]).

use crate::error::{Result, ScreeningError};
use crate::model::{predict_with_deadline, ModelInput, ScoreModel};
use crate::types::{ClassificationResult, ImageRecord};
use log::debug;
use std::sync::Arc;
use std::time::Duration;

#[cfg(doc)]
use crate::types::Decision;

/// Produces a malignancy probability and three-way decision
#[derive(Clone)]
pub struct Classifier {
    model: Arc<dyn ScoreModel>,
    input_size: u32,
    timeout: Duration,
}

impl Classifier {
    pub fn new(model: Arc<dyn ScoreModel>, input_size: u32, timeout: Duration) -> Self {
        Self {
            model,
            input_size,
            timeout,
        }
    }

    /// Classifies a validated image
    ///
    /// Identical inputs give identical results as long as the model is
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::ClassifierUnavailable`] if the model cannot
    /// produce a probability in [0, 1] within the deadline.
    pub fn classify(
        &self,
        record: &ImageRecord,
        threshold: f64,
        margin: f64,
    ) -> Result<ClassificationResult> {
        let input = ModelInput::from_image(record.pixels(), self.input_size);
        let probability = predict_with_deadline(&self.model, input, self.timeout)
            .map_err(ScreeningError::ClassifierUnavailable)?;

        let result = ClassificationResult::new(probability, threshold, margin);
        debug!(
            "{}: {} malignancy probability {:.3} (threshold {:.2} ± {:.2}) -> {}",
            self.model.name(),
            record.filename(),
            probability,
            threshold,
            margin,
            result.decision
        );
        Ok(result)
    }
}
