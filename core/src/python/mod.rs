//! Python bindings for mammoscreen
//!
//! This module provides PyO3 bindings enabling Python services to submit
//! uploaded images to the screening pipeline.

// Suppress false positive warnings from PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

mod enums;
mod errors;
#[macro_use]
mod macros;
mod outcome;
mod pipeline;

pub use enums::*;
pub use errors::*;
pub use outcome::*;
pub use pipeline::*;

/// Python module definition
#[pymodule]
fn _mammoscreen(py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Register exception classes
    m.add(
        "ScreeningError",
        py.get_type_bound::<errors::PyScreeningError>(),
    )?;
    m.add(
        "UnreadableImageError",
        py.get_type_bound::<errors::PyUnreadableImageError>(),
    )?;
    m.add(
        "ImageSizeError",
        py.get_type_bound::<errors::PyImageSizeError>(),
    )?;
    m.add(
        "ServiceUnavailableError",
        py.get_type_bound::<errors::PyServiceUnavailableError>(),
    )?;
    m.add("ConfigError", py.get_type_bound::<errors::PyConfigError>())?;

    // Register enum classes
    m.add_class::<PyDecision>()?;
    m.add_class::<PyOutcomeStatus>()?;

    // Register data structure classes
    m.add_class::<PyPipelineOutcome>()?;

    // Register main API
    m.add_class::<PyScreeningPipeline>()?;

    // Add version
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
