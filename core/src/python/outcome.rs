//! Python wrapper for PipelineOutcome

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::enums::{PyDecision, PyOutcomeStatus};
use super::errors::convert_error;
use crate::types::PipelineOutcome;

/// Result of screening one image
#[pyclass(name = "PipelineOutcome", module = "mammoscreen")]
#[derive(Clone)]
pub struct PyPipelineOutcome {
    pub(crate) inner: PipelineOutcome,
}

#[pymethods]
impl PyPipelineOutcome {
    /// Terminal status of the run
    #[getter]
    fn status(&self) -> PyOutcomeStatus {
        self.inner.status.into()
    }

    #[getter]
    fn filename(&self) -> String {
        self.inner.filename.clone()
    }

    /// Whether the validator accepted the image (None if it never answered)
    #[getter]
    fn is_valid_mammogram(&self) -> Option<bool> {
        self.inner.validation.as_ref().map(|v| v.is_valid_mammogram)
    }

    #[getter]
    fn validation_confidence(&self) -> Option<f64> {
        self.inner.validation.as_ref().map(|v| v.confidence)
    }

    /// Classifier decision (None unless classified)
    #[getter]
    fn decision(&self) -> Option<PyDecision> {
        self.inner
            .classification
            .as_ref()
            .map(|c| c.decision.into())
    }

    #[getter]
    fn malignancy_probability(&self) -> Option<f64> {
        self.inner
            .classification
            .as_ref()
            .map(|c| c.malignancy_probability)
    }

    /// Recommendation text (None unless completed)
    #[getter]
    fn recommendation(&self) -> Option<String> {
        self.inner.recommendation.as_ref().map(|r| r.text.clone())
    }

    /// Error kind name when the run failed
    #[getter]
    fn error_kind(&self) -> Option<&'static str> {
        self.inner.error_kind().map(|k| k.name())
    }

    #[getter]
    fn error_message(&self) -> Option<String> {
        self.inner.failure.as_ref().map(|f| f.message.clone())
    }

    /// Serialize the outcome as JSON
    fn to_json(&self) -> PyResult<String> {
        self.inner
            .to_json()
            .map_err(|e| convert_error(e.into()))
    }

    /// Convert to a flat Python dictionary
    pub fn to_dict(&self, py: Python) -> PyResult<Py<PyDict>> {
        let dict = PyDict::new_bound(py);
        dict.set_item("status", self.inner.status.simple_name())?;
        dict.set_item("filename", self.filename())?;
        dict.set_item("is_valid_mammogram", self.is_valid_mammogram())?;
        dict.set_item("validation_confidence", self.validation_confidence())?;
        dict.set_item(
            "decision",
            self.inner
                .classification
                .as_ref()
                .map(|c| c.decision.label()),
        )?;
        dict.set_item("malignancy_probability", self.malignancy_probability())?;
        dict.set_item("recommendation", self.recommendation())?;
        dict.set_item("error_kind", self.error_kind())?;
        dict.set_item("error_message", self.error_message())?;
        Ok(dict.unbind())
    }

    fn __repr__(&self) -> String {
        let decision = self
            .inner
            .classification
            .as_ref()
            .map(|c| c.decision.label())
            .unwrap_or("none");
        format!(
            "PipelineOutcome(filename={}, status={}, decision={})",
            self.inner.filename, self.inner.status, decision
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}

impl From<PipelineOutcome> for PyPipelineOutcome {
    fn from(inner: PipelineOutcome) -> Self {
        Self { inner }
    }
}
