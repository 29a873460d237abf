pub mod classifier;
pub mod cli;
pub mod context;
pub mod error;
pub mod intake;
pub mod model;
pub mod pipeline;
pub mod recommendation;
pub mod types;
pub mod validator;

#[cfg(feature = "python")]
mod python;

#[cfg(test)]
mod testing;

pub use classifier::Classifier;
pub use cli::report::TextReport;
pub use context::PipelineContext;
pub use error::{ErrorKind, ModelError, Result, ScreeningError};
pub use intake::Intake;
pub use model::{GeminiClient, HttpScoreModel, ModelInput, ScoreModel, TextGenerator};
pub use pipeline::{submit_once, ScreeningPipeline, AUDIT_TARGET};
pub use recommendation::{Audience, MinimalContext, RecommendationRequester};
pub use types::*;
pub use validator::ImageValidator;
