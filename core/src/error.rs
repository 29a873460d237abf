use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for mammoscreen operations
pub type Result<T> = std::result::Result<T, ScreeningError>;

/// Error types for mammoscreen operations
#[derive(Error, Debug)]
pub enum ScreeningError {
    /// Bytes could not be decoded as a supported raster or DICOM image
    #[error("unreadable image: {0}")]
    UnreadableImage(String),

    /// Image dimensions or file size exceed the configured maximum
    #[error("image too large: {0}")]
    ImageTooLarge(String),

    /// Image dimensions or file size fall below the configured minimum
    #[error("image too small: {0}")]
    ImageTooSmall(String),

    /// Mammography validator model could not produce a score
    #[error("validator unavailable: {0}")]
    ValidatorUnavailable(ModelError),

    /// Malignancy classifier model could not produce a probability
    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(ModelError),

    /// Recommendation service failed or timed out
    #[error("recommendation unavailable: {0}")]
    RecommendationUnavailable(ModelError),

    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ScreeningError {
    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScreeningError::UnreadableImage(_) => ErrorKind::UnreadableImage,
            ScreeningError::ImageTooLarge(_) => ErrorKind::ImageTooLarge,
            ScreeningError::ImageTooSmall(_) => ErrorKind::ImageTooSmall,
            ScreeningError::ValidatorUnavailable(_) => ErrorKind::ValidatorUnavailable,
            ScreeningError::ClassifierUnavailable(_) => ErrorKind::ClassifierUnavailable,
            ScreeningError::RecommendationUnavailable(_) => ErrorKind::RecommendationUnavailable,
            ScreeningError::Config(_) => ErrorKind::Config,
            ScreeningError::IoError(_) | ScreeningError::JsonError(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller may retry the same submission later
    ///
    /// Intake errors are user-correctable; outages of external services
    /// are retryable. The pipeline itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ValidatorUnavailable
                | ErrorKind::ClassifierUnavailable
                | ErrorKind::RecommendationUnavailable
        )
    }
}

/// Discriminant of [`ScreeningError`] attached to failed outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    UnreadableImage,
    ImageTooLarge,
    ImageTooSmall,
    ValidatorUnavailable,
    ClassifierUnavailable,
    RecommendationUnavailable,
    Config,
    Internal,
}

impl ErrorKind {
    /// Returns the name used in reports and the audit log
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::UnreadableImage => "UnreadableImage",
            ErrorKind::ImageTooLarge => "ImageTooLarge",
            ErrorKind::ImageTooSmall => "ImageTooSmall",
            ErrorKind::ValidatorUnavailable => "ValidatorUnavailable",
            ErrorKind::ClassifierUnavailable => "ClassifierUnavailable",
            ErrorKind::RecommendationUnavailable => "RecommendationUnavailable",
            ErrorKind::Config => "Config",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Failure of an external model or generation service
///
/// Returned by the capability traits in [`crate::model`]. Each pipeline stage
/// wraps it in the matching `*Unavailable` variant of [`ScreeningError`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Service reported itself unavailable or the transport failed
    #[error("{0}")]
    Unavailable(String),

    /// Call did not finish within the configured deadline
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// Service answered with a score outside [0, 1]
    #[error("score {0} is outside [0, 1]")]
    InvalidScore(f64),

    /// Service answered with a payload that could not be understood
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ModelError::MalformedResponse(format!("{}", e))
        } else {
            ModelError::Unavailable(format!("{}", e))
        }
    }
}

// Decoding errors surface as unreadable images
impl From<image::ImageError> for ScreeningError {
    fn from(e: image::ImageError) -> Self {
        ScreeningError::UnreadableImage(format!("{}", e))
    }
}

impl From<dicom_object::ReadError> for ScreeningError {
    fn from(e: dicom_object::ReadError) -> Self {
        ScreeningError::UnreadableImage(format!("DICOM: {}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for ScreeningError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        ScreeningError::UnreadableImage(format!("DICOM value: {}", e))
    }
}
