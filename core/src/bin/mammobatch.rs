use clap::Parser;
use log::{error, info, warn};
use mammoscreen_core::cli::{setup_logging, OutputFormat, PolicyArgs, ServiceArgs};
use mammoscreen_core::{
    Decision, OutcomeStatus, PipelineContext, PipelineOutcome, ScreeningError, ScreeningPipeline,
};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process;

/// CLI tool for screening every image in a directory
#[derive(Parser, Debug)]
#[command(name = "mammobatch")]
#[command(about = "Screen a directory of mammography images in parallel")]
#[command(version)]
struct Cli {
    /// Directory containing images
    #[arg(value_name = "DIRECTORY")]
    directory: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    #[command(flatten)]
    policy: PolicyArgs,

    #[command(flatten)]
    services: ServiceArgs,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff", "dcm", "dicom"];

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if !cli.directory.is_dir() {
        eprintln!("Error: {} is not a directory", cli.directory.display());
        process::exit(1);
    }

    if let Some(jobs) = cli.jobs {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
        {
            warn!("Could not configure {} worker threads: {}", jobs, e);
        }
    }

    let config = match cli.policy.pipeline_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let pipeline =
        match PipelineContext::from_services(config, &cli.services.service_config()) {
            Ok(context) => ScreeningPipeline::new(context),
            Err(e) => {
                error!("Failed to set up services: {}", e);
                eprintln!("Error: {}", e);
                process::exit(2);
            }
        };

    info!("Processing directory: {}", cli.directory.display());

    let files = match collect_image_files(&cli.directory) {
        Ok(files) => files,
        Err(e) => {
            error!("Failed to read directory: {}", e);
            eprintln!("Error: Failed to read directory: {}", e);
            process::exit(1);
        }
    };

    if files.is_empty() {
        eprintln!("Error: No image files found in directory");
        process::exit(1);
    }

    info!("Found {} image files", files.len());

    let outcomes: Vec<PipelineOutcome> = files
        .par_iter()
        .map(|path| screen_file(&pipeline, path))
        .collect();

    let summary = BatchSummary::from_outcomes(&outcomes);
    info!("{}", summary.one_line());

    match cli.format {
        OutputFormat::Text => {
            for outcome in &outcomes {
                println!("{}", OutcomeLine(outcome));
            }
            println!();
            println!("{}", summary);
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&outcomes) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize to JSON: {}", e);
                eprintln!("Error: Failed to serialize to JSON: {}", e);
                process::exit(1);
            }
        },
    }

    if summary.failed > 0 {
        process::exit(1);
    }
}

/// Reads and screens one file; a file that cannot be read is reported as failed
fn screen_file(pipeline: &ScreeningPipeline, path: &Path) -> PipelineOutcome {
    let filename = path.display().to_string();
    match std::fs::read(path) {
        Ok(bytes) => pipeline.submit(&bytes, &filename),
        Err(e) => {
            let err = ScreeningError::from(e);
            warn!("{}: {}", filename, err);
            PipelineOutcome::failed(&filename, &err)
        }
    }
}

fn collect_image_files(directory: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_file() && has_image_extension(&path) {
            files.push(path);
        }
    }

    // Stable output order regardless of directory iteration order
    files.sort();
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// One line per outcome in text output
struct OutcomeLine<'a>(&'a PipelineOutcome);

impl<'a> fmt::Display for OutcomeLine<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.0;
        write!(f, "{}: {}", outcome.filename, outcome.status)?;
        if let Some(classification) = &outcome.classification {
            write!(
                f,
                " ({}, p={:.3})",
                classification.decision, classification.malignancy_probability
            )?;
        }
        if let Some(failure) = &outcome.failure {
            write!(f, " [{}: {}]", failure.kind, failure.message)?;
        }
        Ok(())
    }
}

/// Counts per status and decision
#[derive(Debug, Default, PartialEq)]
struct BatchSummary {
    total: usize,
    rejected: usize,
    failed: usize,
    cancerous: usize,
    non_cancerous: usize,
    inconclusive: usize,
}

impl BatchSummary {
    fn from_outcomes(outcomes: &[PipelineOutcome]) -> Self {
        let mut summary = BatchSummary {
            total: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome.status {
                OutcomeStatus::Rejected => summary.rejected += 1,
                OutcomeStatus::Failed => summary.failed += 1,
                OutcomeStatus::Classified | OutcomeStatus::Completed => {}
            }
            match outcome.classification.as_ref().map(|c| c.decision) {
                Some(Decision::Cancerous) => summary.cancerous += 1,
                Some(Decision::NonCancerous) => summary.non_cancerous += 1,
                Some(Decision::Inconclusive) => summary.inconclusive += 1,
                None => {}
            }
        }
        summary
    }

    fn one_line(&self) -> String {
        format!(
            "Screened {} file(s): {} rejected, {} failed, {} cancerous, {} non-cancerous, {} inconclusive",
            self.total,
            self.rejected,
            self.failed,
            self.cancerous,
            self.non_cancerous,
            self.inconclusive
        )
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch Summary")?;
        writeln!(f, "=============")?;
        writeln!(f, "Total:          {}", self.total)?;
        writeln!(f, "Rejected:       {}", self.rejected)?;
        writeln!(f, "Failed:         {}", self.failed)?;
        writeln!(f, "Cancerous:      {}", self.cancerous)?;
        writeln!(f, "Non-Cancerous:  {}", self.non_cancerous)?;
        write!(f, "Inconclusive:   {}", self.inconclusive)
    }
}
