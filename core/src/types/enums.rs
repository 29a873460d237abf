use serde::{Deserialize, Serialize};
use std::fmt;

/// Slack applied at the band edges so that decimal edges such as
/// `0.2 + 0.1` still compare equal to `0.3`
pub const EDGE_EPSILON: f64 = 1e-9;

/// Three-way malignancy decision produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Cancerous,
    NonCancerous,
    /// Probability fell inside the indeterminate band; routed to human review
    Inconclusive,
}

impl Decision {
    /// Applies the threshold/margin policy to a malignancy probability
    ///
    /// - `p >= threshold + margin` → [`Decision::Cancerous`]
    /// - `p <= threshold - margin` → [`Decision::NonCancerous`]
    /// - otherwise → [`Decision::Inconclusive`]
    ///
    /// Edges are compared with [`EDGE_EPSILON`] of slack, so a probability
    /// on a band edge is decisive however the edge rounds in binary. A
    /// probability exactly at the threshold is inconclusive for any margin
    /// larger than that slack.
    ///
    /// # Example
    ///
    /// ```
    /// use mammoscreen_core::Decision;
    ///
    /// assert_eq!(Decision::from_probability(0.82, 0.75, 0.05), Decision::Cancerous);
    /// assert_eq!(Decision::from_probability(0.77, 0.75, 0.05), Decision::Inconclusive);
    /// assert_eq!(Decision::from_probability(0.10, 0.75, 0.05), Decision::NonCancerous);
    /// ```
    pub fn from_probability(p: f64, threshold: f64, margin: f64) -> Self {
        if p - (threshold + margin) >= -EDGE_EPSILON {
            Decision::Cancerous
        } else if p - (threshold - margin) <= EDGE_EPSILON {
            Decision::NonCancerous
        } else {
            Decision::Inconclusive
        }
    }

    /// Whether this decision is eligible for an AI recommendation
    pub fn is_conclusive(&self) -> bool {
        !matches!(self, Decision::Inconclusive)
    }

    /// Returns the label sent to the recommendation service and shown in reports
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Cancerous => "Cancerous",
            Decision::NonCancerous => "Non-Cancerous",
            Decision::Inconclusive => "Inconclusive",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Terminal status of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeStatus {
    /// Validator judged the image not to be a mammogram
    Rejected,
    /// Classification done, no recommendation attached
    Classified,
    /// Classification done and recommendation attached
    Completed,
    /// A stage failed; see the attached failure report
    Failed,
}

impl OutcomeStatus {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            OutcomeStatus::Rejected => "rejected",
            OutcomeStatus::Classified => "classified",
            OutcomeStatus::Completed => "completed",
            OutcomeStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Reason code attached to a negative validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// Model confidence that the image is a mammogram was below the threshold
    LowMammographyConfidence,
}

impl RejectionReason {
    /// Returns the human-readable reason
    pub fn description(&self) -> &'static str {
        match self {
            RejectionReason::LowMammographyConfidence => {
                "image does not appear to be a breast mammogram"
            }
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Container format the image was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    Tiff,
    Dicom,
    Other,
}

impl ImageFormat {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Dicom => "dicom",
            ImageFormat::Other => "other",
        }
    }
}

impl From<image::ImageFormat> for ImageFormat {
    fn from(format: image::ImageFormat) -> Self {
        match format {
            image::ImageFormat::Png => ImageFormat::Png,
            image::ImageFormat::Jpeg => ImageFormat::Jpeg,
            image::ImageFormat::Bmp => ImageFormat::Bmp,
            image::ImageFormat::Tiff => ImageFormat::Tiff,
            _ => ImageFormat::Other,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Coarse risk band derived from the malignancy probability
///
/// Annotation only; never feeds back into [`Decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Low below 0.10, moderate below 0.50, high otherwise
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.50 {
            RiskLevel::High
        } else if p >= 0.10 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Follow-up urgency derived from the malignancy probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Urgency {
    Routine,
    Urgent,
    Immediate,
}

impl Urgency {
    /// Routine below 0.25, urgent below 0.75, immediate otherwise
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.75 {
            Urgency::Immediate
        } else if p >= 0.25 {
            Urgency::Urgent
        } else {
            Urgency::Routine
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            Urgency::Routine => "routine",
            Urgency::Urgent => "urgent",
            Urgency::Immediate => "immediate",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}
