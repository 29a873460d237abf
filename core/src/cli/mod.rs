pub mod report;

use crate::error::Result;
use crate::types::{PipelineConfig, ServiceConfig};
use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for mammoscreen
#[derive(Parser, Debug)]
#[command(name = "mammoscreen")]
#[command(about = "AI mammography screening: validate, classify and recommend")]
#[command(version)]
pub struct Cli {
    /// Path to the image (PNG, JPEG, BMP, TIFF or DICOM)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub services: ServiceArgs,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

/// Decision policy overrides
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// JSON file with pipeline settings; flags below take precedence
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Malignancy decision threshold
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Half-width of the inconclusive band around the threshold
    #[arg(short, long)]
    pub margin: Option<f64>,

    /// Minimum validator confidence to accept an image as a mammogram
    #[arg(long)]
    pub validation_threshold: Option<f64>,

    /// Per-call deadline for model and recommendation services, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl PolicyArgs {
    /// Loads the configuration file if given and applies flag overrides
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(threshold) = self.threshold {
            config = config.with_confidence_threshold(threshold);
        }
        if let Some(margin) = self.margin {
            config = config.with_indeterminate_margin(margin);
        }
        if let Some(threshold) = self.validation_threshold {
            config = config.with_validation_threshold(threshold);
        }
        if let Some(secs) = self.timeout {
            config = config.with_call_timeout(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }
}

/// Endpoints of the external AI services
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Score endpoint of the mammography validator model
    #[arg(long, env = "MAMMOSCREEN_VALIDATOR_URL", default_value = "http://127.0.0.1:8501/validate")]
    pub validator_url: String,

    /// Score endpoint of the malignancy classifier model
    #[arg(long, env = "MAMMOSCREEN_CLASSIFIER_URL", default_value = "http://127.0.0.1:8501/classify")]
    pub classifier_url: String,

    /// Gemini model used for recommendations
    #[arg(long, default_value = ServiceConfig::DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    /// Google API key for the Gemini service
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true, default_value = "")]
    pub api_key: String,
}

impl ServiceArgs {
    pub fn service_config(&self) -> ServiceConfig {
        let mut services = ServiceConfig::new(
            self.validator_url.clone(),
            self.classifier_url.clone(),
            self.api_key.clone(),
        );
        services.gemini_model = self.gemini_model.clone();
        services
    }
}

/// Initializes env_logger; `RUST_LOG` still overrides per module
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScreeningError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["mammoscreen", "scan.png"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("scan.png"));
        assert!(matches!(cli.format, OutputFormat::Text));
        assert!(!cli.verbose);

        let config = cli.policy.pipeline_config().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "mammoscreen",
            "scan.dcm",
            "--threshold",
            "0.6",
            "--margin",
            "0.1",
            "--validation-threshold",
            "0.9",
            "--timeout",
            "3",
            "--format",
            "json",
        ])
        .unwrap();

        let config = cli.policy.pipeline_config().unwrap();
        assert_eq!(config.confidence_threshold, 0.6);
        assert_eq!(config.indeterminate_margin, 0.1);
        assert_eq!(config.validation_threshold, 0.9);
        assert_eq!(config.call_timeout(), Duration::from_secs(3));
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn test_config_file_then_flags() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"confidence_threshold": 0.5, "indeterminate_margin": 0.02}}"#).unwrap();

        let policy = PolicyArgs {
            config: Some(file.path().to_path_buf()),
            margin: Some(0.04),
            ..Default::default()
        };
        let config = policy.pipeline_config().unwrap();
        assert_eq!(config.confidence_threshold, 0.5);
        assert_eq!(config.indeterminate_margin, 0.04);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let policy = PolicyArgs {
            threshold: Some(1.5),
            ..Default::default()
        };
        assert!(matches!(
            policy.pipeline_config(),
            Err(ScreeningError::Config(_))
        ));
    }

    #[test]
    fn test_service_config_from_args() {
        let cli = Cli::try_parse_from([
            "mammoscreen",
            "scan.png",
            "--classifier-url",
            "http://models:9000/classify",
            "--gemini-model",
            "gemini-1.5-pro",
            "--api-key",
            "secret",
        ])
        .unwrap();

        let services = cli.services.service_config();
        assert_eq!(services.classifier_url, "http://models:9000/classify");
        assert_eq!(services.gemini_model, "gemini-1.5-pro");
        assert_eq!(services.api_key, "secret");
        assert!(!format!("{:?}", services).contains("secret"));
    }
}
