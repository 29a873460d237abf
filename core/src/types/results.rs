use crate::types::{Decision, RejectionReason, RiskLevel, Urgency};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verdict of the mammography validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the image is plausibly a mammogram suitable for analysis
    pub is_valid_mammogram: bool,

    /// Model confidence in [0, 1] that the image is a mammogram
    pub confidence: f64,

    /// Set when `is_valid_mammogram` is false
    pub rejection_reason: Option<RejectionReason>,
}

impl ValidationResult {
    /// Applies `confidence >= threshold` to a validator score
    pub fn from_confidence(confidence: f64, threshold: f64) -> Self {
        let is_valid_mammogram = confidence >= threshold;
        Self {
            is_valid_mammogram,
            confidence,
            rejection_reason: (!is_valid_mammogram)
                .then_some(RejectionReason::LowMammographyConfidence),
        }
    }
}

/// Output of the malignancy classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Model probability of malignancy in [0, 1]
    pub malignancy_probability: f64,

    /// Three-way decision
    pub decision: Decision,

    /// Threshold the decision was taken against
    pub threshold: f64,

    /// Half-width of the inconclusive band used
    pub margin: f64,
}

impl ClassificationResult {
    /// Builds a result, deriving the decision from probability, threshold and margin
    pub fn new(malignancy_probability: f64, threshold: f64, margin: f64) -> Self {
        Self {
            malignancy_probability,
            decision: Decision::from_probability(malignancy_probability, threshold, margin),
            threshold,
            margin,
        }
    }

    /// Coarse risk band for display
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.malignancy_probability)
    }

    /// Suggested follow-up urgency for display
    pub fn urgency(&self) -> Urgency {
        Urgency::from_probability(self.malignancy_probability)
    }
}

/// Free-text guidance returned by the recommendation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// Service response, relayed unmodified
    pub text: String,

    /// When the response was received
    pub generated_at: DateTime<Utc>,
}
