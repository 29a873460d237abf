//! Python wrapper for ScreeningPipeline

use pyo3::prelude::*;
use std::path::PathBuf;

use super::errors::convert_error;
use super::outcome::PyPipelineOutcome;
use crate::context::PipelineContext;
use crate::pipeline::ScreeningPipeline;
use crate::types::{PipelineConfig, ServiceConfig};

/// Screening pipeline bound to the validator, classifier and Gemini services
///
/// The pipeline is safe to share between Python threads; the GIL is released
/// while an image is screened.
#[pyclass(name = "ScreeningPipeline", module = "mammoscreen")]
pub struct PyScreeningPipeline {
    inner: ScreeningPipeline,
}

#[pymethods]
impl PyScreeningPipeline {
    /// Create a pipeline
    ///
    /// Args:
    ///     validator_url: Score endpoint of the mammography validator
    ///     classifier_url: Score endpoint of the malignancy classifier
    ///     api_key: Google API key for Gemini
    ///     config_path: Optional JSON file with pipeline settings
    ///     threshold: Malignancy threshold override
    ///     margin: Inconclusive band half-width override
    ///     validation_threshold: Validator acceptance threshold override
    ///     gemini_model: Gemini model name (default: gemini-1.5-flash)
    ///
    /// Raises:
    ///     ConfigError: If a setting is invalid or the API key is empty
    #[new]
    #[pyo3(signature = (
        validator_url,
        classifier_url,
        api_key,
        config_path=None,
        threshold=None,
        margin=None,
        validation_threshold=None,
        gemini_model=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        validator_url: String,
        classifier_url: String,
        api_key: String,
        config_path: Option<PathBuf>,
        threshold: Option<f64>,
        margin: Option<f64>,
        validation_threshold: Option<f64>,
        gemini_model: Option<String>,
    ) -> PyResult<Self> {
        let mut config = match config_path {
            Some(path) => PipelineConfig::from_json_file(&path).map_err(convert_error)?,
            None => PipelineConfig::default(),
        };
        if let Some(threshold) = threshold {
            config = config.with_confidence_threshold(threshold);
        }
        if let Some(margin) = margin {
            config = config.with_indeterminate_margin(margin);
        }
        if let Some(threshold) = validation_threshold {
            config = config.with_validation_threshold(threshold);
        }

        let mut services = ServiceConfig::new(validator_url, classifier_url, api_key);
        if let Some(model) = gemini_model {
            services.gemini_model = model;
        }

        let context = PipelineContext::from_services(config, &services).map_err(convert_error)?;
        Ok(Self {
            inner: ScreeningPipeline::new(context),
        })
    }

    /// Screen one uploaded image
    ///
    /// Args:
    ///     data: Raw file bytes (PNG, JPEG, BMP, TIFF or DICOM)
    ///     filename: Name reported back in the outcome
    ///
    /// Returns:
    ///     PipelineOutcome: Never raises for per-image failures; check
    ///     `status` and `error_kind`
    ///
    /// Example:
    ///     >>> from mammoscreen import ScreeningPipeline
    ///     >>> pipeline = ScreeningPipeline(validator_url, classifier_url, api_key)
    ///     >>> outcome = pipeline.submit(open("scan.png", "rb").read(), "scan.png")
    ///     >>> print(outcome.decision)
    #[pyo3(signature = (data, filename))]
    fn submit(&self, py: Python<'_>, data: &[u8], filename: &str) -> PyPipelineOutcome {
        py.allow_threads(|| self.inner.submit(data, filename)).into()
    }

    /// Read a file and screen it
    ///
    /// Raises:
    ///     OSError: If the file cannot be read
    #[pyo3(signature = (path))]
    fn submit_file(&self, py: Python<'_>, path: PathBuf) -> PyResult<PyPipelineOutcome> {
        let data = std::fs::read(&path).map_err(|e| {
            pyo3::exceptions::PyIOError::new_err(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let filename = path.display().to_string();
        Ok(py
            .allow_threads(|| self.inner.submit(&data, &filename))
            .into())
    }

    /// Malignancy threshold in use
    #[getter]
    fn threshold(&self) -> f64 {
        self.inner.context().config().confidence_threshold
    }

    /// Inconclusive band half-width in use
    #[getter]
    fn margin(&self) -> f64 {
        self.inner.context().config().indeterminate_margin
    }

    fn __repr__(&self) -> String {
        let config = self.inner.context().config();
        format!(
            "ScreeningPipeline(threshold={}, margin={})",
            config.confidence_threshold, config.indeterminate_margin
        )
    }
}
