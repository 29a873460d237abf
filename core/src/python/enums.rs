//! Python wrappers for mammoscreen enums

use pyo3::prelude::*;

use super::macros::impl_py_wrapper;
use crate::types::{Decision, OutcomeStatus};

// ============================================================================
// Decision
// ============================================================================

#[pyclass(name = "Decision", module = "mammoscreen")]
#[derive(Clone, Debug)]
pub struct PyDecision {
    pub(crate) inner: Decision,
}

#[pymethods]
impl PyDecision {
    #[classattr]
    const CANCEROUS: Self = Self {
        inner: Decision::Cancerous,
    };
    #[classattr]
    const NON_CANCEROUS: Self = Self {
        inner: Decision::NonCancerous,
    };
    #[classattr]
    const INCONCLUSIVE: Self = Self {
        inner: Decision::Inconclusive,
    };

    /// Whether the decision is Cancerous or Non-Cancerous
    fn is_conclusive(&self) -> bool {
        self.inner.is_conclusive()
    }

    pub fn label(&self) -> &'static str {
        self.inner.label()
    }

    fn __str__(&self) -> String {
        self.inner.label().to_string()
    }

    fn __repr__(&self) -> String {
        format!("Decision.{:?}", self.inner)
    }

    fn __eq__(&self, other: &PyDecision) -> bool {
        self.inner == other.inner
    }

    fn __hash__(&self) -> u64 {
        self.inner_hash()
    }
}

impl_py_wrapper!(PyDecision, Decision);

// ============================================================================
// OutcomeStatus
// ============================================================================

#[pyclass(name = "OutcomeStatus", module = "mammoscreen")]
#[derive(Clone, Debug)]
pub struct PyOutcomeStatus {
    pub(crate) inner: OutcomeStatus,
}

#[pymethods]
impl PyOutcomeStatus {
    #[classattr]
    const REJECTED: Self = Self {
        inner: OutcomeStatus::Rejected,
    };
    #[classattr]
    const CLASSIFIED: Self = Self {
        inner: OutcomeStatus::Classified,
    };
    #[classattr]
    const COMPLETED: Self = Self {
        inner: OutcomeStatus::Completed,
    };
    #[classattr]
    const FAILED: Self = Self {
        inner: OutcomeStatus::Failed,
    };

    pub fn simple_name(&self) -> &'static str {
        self.inner.simple_name()
    }

    fn __str__(&self) -> String {
        self.inner.simple_name().to_string()
    }

    fn __repr__(&self) -> String {
        format!("OutcomeStatus.{:?}", self.inner)
    }

    fn __eq__(&self, other: &PyOutcomeStatus) -> bool {
        self.inner == other.inner
    }

    fn __hash__(&self) -> u64 {
        self.inner_hash()
    }
}

impl_py_wrapper!(PyOutcomeStatus, OutcomeStatus);
