use crate::error::{Result, ScreeningError};
use crate::types::EDGE_EPSILON;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Inclusive pixel-dimension bounds applied at intake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBounds {
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
}

impl SizeBounds {
    /// Creates bounds from a minimum and maximum square edge
    pub fn square(min_edge: u32, max_edge: u32) -> Self {
        Self {
            min_width: min_edge,
            min_height: min_edge,
            max_width: max_edge,
            max_height: max_edge,
        }
    }

    /// Whether either dimension is below the minimum
    pub fn is_too_small(&self, width: u32, height: u32) -> bool {
        width < self.min_width || height < self.min_height
    }

    /// Whether either dimension is above the maximum
    pub fn is_too_large(&self, width: u32, height: u32) -> bool {
        width > self.max_width || height > self.max_height
    }
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self::square(64, 8192)
    }
}

/// Pipeline policy read once at process start
///
/// All values are plain data; the configuration is shared read-only between
/// concurrent pipeline runs.
///
/// # Example
///
/// ```
/// use mammoscreen_core::PipelineConfig;
/// use std::time::Duration;
///
/// let config = PipelineConfig::default()
///     .with_confidence_threshold(0.8)
///     .with_indeterminate_margin(0.1)
///     .with_call_timeout(Duration::from_secs(5));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.confidence_threshold, 0.8);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Malignancy threshold the classifier decision is centred on
    pub confidence_threshold: f64,

    /// Minimum validator confidence for an image to count as a mammogram
    pub validation_threshold: f64,

    /// Half-width of the inconclusive band around `confidence_threshold`
    pub indeterminate_margin: f64,

    /// Pixel-dimension bounds
    pub size_bounds: SizeBounds,

    /// Largest accepted upload in bytes
    pub max_file_bytes: usize,

    /// Smallest accepted upload in bytes; 0 disables the floor
    ///
    /// Uploads below the floor are reported as unreadable, never as too
    /// small: that kind is reserved for pixel dimensions.
    pub min_file_bytes: usize,

    /// Edge length of the square model input tensor
    pub model_input_size: u32,

    /// Deadline for each external call, in milliseconds
    pub call_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.75,
            validation_threshold: 0.75,
            indeterminate_margin: 0.05,
            size_bounds: SizeBounds::default(),
            max_file_bytes: 50 * 1024 * 1024,
            min_file_bytes: 0,
            model_input_size: 224,
            call_timeout_ms: 10_000,
        }
    }
}

impl PipelineConfig {
    /// Loads a configuration from a JSON file
    ///
    /// Missing fields take their default values. The result is validated.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::Config`] if a threshold lies outside [0, 1],
    /// the margin is not strictly positive, size or file bounds are inverted,
    /// or the model input size or timeout is zero.
    pub fn validate(&self) -> Result<()> {
        check_unit_interval("confidence_threshold", self.confidence_threshold)?;
        check_unit_interval("validation_threshold", self.validation_threshold)?;

        if !(self.indeterminate_margin > EDGE_EPSILON && self.indeterminate_margin < 1.0) {
            return Err(ScreeningError::Config(format!(
                "indeterminate_margin must be in (0, 1), got {}",
                self.indeterminate_margin
            )));
        }

        let b = &self.size_bounds;
        if b.min_width == 0 || b.min_height == 0 {
            return Err(ScreeningError::Config(
                "size_bounds minimums must be positive".to_string(),
            ));
        }
        if b.min_width > b.max_width || b.min_height > b.max_height {
            return Err(ScreeningError::Config(format!(
                "size_bounds are inverted: min {}x{}, max {}x{}",
                b.min_width, b.min_height, b.max_width, b.max_height
            )));
        }

        if self.min_file_bytes > self.max_file_bytes {
            return Err(ScreeningError::Config(format!(
                "min_file_bytes ({}) exceeds max_file_bytes ({})",
                self.min_file_bytes, self.max_file_bytes
            )));
        }

        if self.model_input_size == 0 {
            return Err(ScreeningError::Config(
                "model_input_size must be positive".to_string(),
            ));
        }

        if self.call_timeout_ms == 0 {
            return Err(ScreeningError::Config(
                "call_timeout_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the per-call deadline
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Builder: Set the malignancy threshold
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Builder: Set the validator threshold
    pub fn with_validation_threshold(mut self, threshold: f64) -> Self {
        self.validation_threshold = threshold;
        self
    }

    /// Builder: Set the indeterminate margin
    pub fn with_indeterminate_margin(mut self, margin: f64) -> Self {
        self.indeterminate_margin = margin;
        self
    }

    /// Builder: Set pixel-dimension bounds
    pub fn with_size_bounds(mut self, bounds: SizeBounds) -> Self {
        self.size_bounds = bounds;
        self
    }

    /// Builder: Set accepted upload size range in bytes
    pub fn with_file_bytes(mut self, min: usize, max: usize) -> Self {
        self.min_file_bytes = min;
        self.max_file_bytes = max;
        self
    }

    /// Builder: Set the per-call deadline
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_ms = timeout.as_millis().min(u64::MAX as u128) as u64;
        self
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ScreeningError::Config(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )))
    }
}

/// Endpoints and credentials of the external services
///
/// Kept apart from [`PipelineConfig`] so the policy can be logged or
/// serialized without leaking the API key.
#[derive(Clone, PartialEq)]
pub struct ServiceConfig {
    /// Score endpoint answering "is this a mammogram"
    pub validator_url: String,

    /// Score endpoint answering "probability of malignancy"
    pub classifier_url: String,

    /// Gemini REST base URL
    pub gemini_base_url: String,

    /// Gemini model name
    pub gemini_model: String,

    /// Sampling temperature for recommendations
    pub temperature: f32,

    /// Upper bound on recommendation length
    pub max_output_tokens: u32,

    /// Google API key
    pub api_key: String,
}

impl ServiceConfig {
    pub const DEFAULT_GEMINI_BASE_URL: &'static str =
        "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_GEMINI_MODEL: &'static str = "gemini-1.5-flash";

    /// Creates a service configuration with the default Gemini settings
    pub fn new(validator_url: String, classifier_url: String, api_key: String) -> Self {
        Self {
            validator_url,
            classifier_url,
            gemini_base_url: Self::DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: Self::DEFAULT_GEMINI_MODEL.to_string(),
            temperature: 0.3,
            max_output_tokens: 1000,
            api_key,
        }
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("validator_url", &self.validator_url)
            .field("classifier_url", &self.classifier_url)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_model", &self.gemini_model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
