//! Python exception types for mammoscreen
//!
//! Error kinds are grouped into four exception classes deriving from
//! `ScreeningError`; internal errors raise the base class itself.

// Suppress warnings from PyO3's create_exception! macro about gil-refs feature
#![allow(unexpected_cfgs)]

use pyo3::{create_exception, exceptions::PyException, prelude::*};

use crate::error::{ErrorKind, ScreeningError};

// Base exception
create_exception!(
    mammoscreen,
    PyScreeningError,
    PyException,
    "Base exception for all mammoscreen errors"
);

create_exception!(
    mammoscreen,
    PyUnreadableImageError,
    PyScreeningError,
    "Upload could not be decoded as an image"
);

create_exception!(
    mammoscreen,
    PyImageSizeError,
    PyScreeningError,
    "Image or file size outside the accepted bounds"
);

create_exception!(
    mammoscreen,
    PyServiceUnavailableError,
    PyScreeningError,
    "Validator, classifier or recommendation service failed or timed out"
);

create_exception!(
    mammoscreen,
    PyConfigError,
    PyScreeningError,
    "Invalid pipeline or service configuration"
);

/// Convert a Rust ScreeningError to the matching Python exception
pub fn convert_error(err: ScreeningError) -> PyErr {
    let message = err.to_string();
    match err.kind() {
        ErrorKind::UnreadableImage => PyUnreadableImageError::new_err(message),
        ErrorKind::ImageTooLarge | ErrorKind::ImageTooSmall => PyImageSizeError::new_err(message),
        ErrorKind::ValidatorUnavailable
        | ErrorKind::ClassifierUnavailable
        | ErrorKind::RecommendationUnavailable => PyServiceUnavailableError::new_err(message),
        ErrorKind::Config => PyConfigError::new_err(message),
        ErrorKind::Internal => PyScreeningError::new_err(message),
    }
}
