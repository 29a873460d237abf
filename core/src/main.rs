use clap::Parser;
use log::{error, info};
use mammoscreen_core::cli::{setup_logging, Cli, OutputFormat};
use mammoscreen_core::{OutcomeStatus, PipelineContext, ScreeningPipeline, TextReport};
use std::process;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    info!("Processing file: {}", cli.file.display());

    let config = match cli.policy.pipeline_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let context = match PipelineContext::from_services(config, &cli.services.service_config()) {
        Ok(context) => context,
        Err(e) => {
            error!("Failed to set up services: {}", e);
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let bytes = match std::fs::read(&cli.file) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read {}: {}", cli.file.display(), e);
            eprintln!("Error: Failed to read {}: {}", cli.file.display(), e);
            process::exit(1);
        }
    };

    let filename = cli
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.file.display().to_string());

    let outcome = ScreeningPipeline::new(context).submit(&bytes, &filename);

    match cli.format {
        OutputFormat::Text => {
            let report = TextReport::new(&outcome);
            println!("{}", report);
        }
        OutputFormat::Json => match outcome.to_json_pretty() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize to JSON: {}", e);
                eprintln!("Error: Failed to serialize to JSON: {}", e);
                process::exit(1);
            }
        },
    }

    if outcome.status == OutcomeStatus::Failed {
        process::exit(1);
    }
}
