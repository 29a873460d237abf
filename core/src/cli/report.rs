use crate::types::{OutcomeStatus, PipelineOutcome};
use std::fmt;

/// Text report formatter for a screening outcome
pub struct TextReport<'a> {
    outcome: &'a PipelineOutcome,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(outcome: &'a PipelineOutcome) -> Self {
        Self { outcome }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.outcome;

        writeln!(f, "Mammography Screening")?;
        writeln!(f, "=====================")?;
        writeln!(f)?;
        writeln!(f, "File:           {}", outcome.filename)?;
        writeln!(f, "Status:         {}", outcome.status)?;

        if let Some(image) = &outcome.image {
            writeln!(
                f,
                "Image:          {} {}x{}, {} channel(s)",
                image.format, image.width, image.height, image.channels
            )?;
            if let Some(dicom) = &image.dicom {
                writeln!(
                    f,
                    "Modality:       {}",
                    dicom.modality.as_deref().unwrap_or("unknown")
                )?;
                writeln!(
                    f,
                    "Laterality:     {}",
                    dicom.image_laterality.as_deref().unwrap_or("unknown")
                )?;
                writeln!(
                    f,
                    "View Position:  {}",
                    dicom.view_position.as_deref().unwrap_or("unknown")
                )?;
            }
        }

        if let Some(validation) = &outcome.validation {
            writeln!(f)?;
            writeln!(f, "Validation")?;
            writeln!(f, "----------")?;
            writeln!(f, "Mammogram:      {}", validation.is_valid_mammogram)?;
            writeln!(f, "Confidence:     {:.1}%", validation.confidence * 100.0)?;
            if let Some(reason) = &validation.rejection_reason {
                writeln!(f, "Reason:         {}", reason.description())?;
            }
        }

        if let Some(classification) = &outcome.classification {
            writeln!(f)?;
            writeln!(f, "Classification")?;
            writeln!(f, "--------------")?;
            writeln!(f, "Decision:       {}", classification.decision)?;
            writeln!(
                f,
                "Probability:    {:.1}% (threshold {:.1}% ± {:.1}%)",
                classification.malignancy_probability * 100.0,
                classification.threshold * 100.0,
                classification.margin * 100.0
            )?;
            writeln!(f, "Risk Level:     {}", classification.risk_level())?;
            writeln!(f, "Urgency:        {}", classification.urgency())?;
            if !classification.decision.is_conclusive() {
                writeln!(f, "Inconclusive result: refer for human review")?;
            }
        }

        if let Some(recommendation) = &outcome.recommendation {
            writeln!(f)?;
            writeln!(f, "Recommendation")?;
            writeln!(f, "--------------")?;
            writeln!(f, "{}", recommendation.text.trim_end())?;
        }

        if let Some(err) = &outcome.recommendation_error {
            writeln!(f)?;
            writeln!(f, "Recommendation unavailable: {}", err.message)?;
        }

        if outcome.status == OutcomeStatus::Failed {
            if let Some(failure) = &outcome.failure {
                writeln!(f)?;
                writeln!(f, "Error ({}): {}", failure.kind, failure.message)?;
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "AI screening aid only. Results must be reviewed by a qualified radiologist."
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ModelError, ScreeningError};
    use crate::types::{
        ClassificationResult, FailureReport, ImageFormat, ImageMetadata, RecommendationResult,
        ValidationResult,
    };
    use chrono::Utc;

    fn outcome(status: OutcomeStatus) -> PipelineOutcome {
        PipelineOutcome {
            status,
            filename: "scan.png".to_string(),
            image: Some(ImageMetadata {
                filename: "scan.png".to_string(),
                format: ImageFormat::Png,
                width: 1024,
                height: 768,
                channels: 1,
                byte_depth: 1,
                ingested_at: Utc::now(),
                dicom: None,
            }),
            validation: Some(ValidationResult::from_confidence(0.93, 0.75)),
            classification: None,
            recommendation: None,
            failure: None,
            recommendation_error: None,
        }
    }

    #[test]
    fn test_completed_report() {
        let mut completed = outcome(OutcomeStatus::Completed);
        completed.classification = Some(ClassificationResult::new(0.82, 0.75, 0.05));
        completed.recommendation = Some(RecommendationResult {
            text: "Refer for diagnostic workup.\n".to_string(),
            generated_at: Utc::now(),
        });

        let output = format!("{}", TextReport::new(&completed));

        assert!(output.contains("Mammography Screening"));
        assert!(output.contains("File:           scan.png"));
        assert!(output.contains("Status:         completed"));
        assert!(output.contains("Confidence:     93.0%"));
        assert!(output.contains("Decision:       Cancerous"));
        assert!(output.contains("Probability:    82.0% (threshold 75.0% ± 5.0%)"));
        assert!(output.contains("Refer for diagnostic workup."));
        assert!(!output.contains("human review"));
    }

    #[test]
    fn test_inconclusive_report() {
        let mut classified = outcome(OutcomeStatus::Classified);
        classified.classification = Some(ClassificationResult::new(0.77, 0.75, 0.05));

        let output = format!("{}", TextReport::new(&classified));
        assert!(output.contains("Decision:       Inconclusive"));
        assert!(output.contains("refer for human review"));
        assert!(!output.contains("Recommendation\n"));
    }

    #[test]
    fn test_failed_report() {
        let mut failed = outcome(OutcomeStatus::Failed);
        let err = ScreeningError::ClassifierUnavailable(ModelError::Unavailable(
            "connection refused".to_string(),
        ));
        failed.failure = Some(FailureReport::from(&err));

        let output = format!("{}", TextReport::new(&failed));
        assert!(output.contains("Status:         failed"));
        assert!(output.contains(&format!(
            "Error ({}): classifier unavailable: connection refused",
            ErrorKind::ClassifierUnavailable
        )));
    }
}
