//! Core type definitions for the screening pipeline
//!
//! This module provides the data model shared by every pipeline stage:
//! - [`ImageRecord`]: Decoded upload, immutable after intake
//! - [`ValidationResult`]: Mammography validator verdict
//! - [`ClassificationResult`]: Malignancy probability and three-way [`Decision`]
//! - [`RecommendationResult`]: Relayed recommendation text
//! - [`PipelineOutcome`]: Aggregate returned to the caller
//! - [`PipelineConfig`]: Threshold, margin and bounds policy

mod config;
mod enums;
mod image_record;
mod outcome;
mod results;

pub use config::{PipelineConfig, ServiceConfig, SizeBounds};
pub use enums::{
    Decision, ImageFormat, EDGE_EPSILON, OutcomeStatus, RejectionReason, RiskLevel, Urgency,
};
pub use image_record::{DicomSummary, ImageMetadata, ImageRecord};
pub use outcome::{FailureReport, PipelineOutcome};
pub use results::{ClassificationResult, RecommendationResult, ValidationResult};
