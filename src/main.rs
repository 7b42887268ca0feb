// src/main.rs
use anyhow::Result;
use clap::Parser;
use tracing::info;

use crop_classify::batch::process_batch;
use crop_classify::cli::{Cli, Commands};
use crop_classify::io::writer::{
    ClassificationOutput, HealthMapOutput, SensorOutput, SignatureOutput,
};
use crop_classify::io::{load_dataset, write_json};
use crop_classify::processing::indices::{Ndvi, Savi, SpectralIndex};
use crop_classify::processing::InferenceEngine;
use crop_classify::sensor::generate_series;
use crop_classify::session::Session;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Classify {
            input,
            patch_size,
            batch_size,
            workers,
            sequential,
        } => {
            let (cube, ground_truth) = load_dataset(input)?;
            let mut session = Session::new();
            session.load_dataset(cube, ground_truth)?;
            let classes = session.fit_centroid_classifier()?;
            info!(classes, "classifier fitted from ground truth");

            let engine = InferenceEngine::new(*patch_size, *batch_size, *workers)?;
            let (map, summary) = session.run_analysis(&engine, !*sequential)?;
            write_json(&cli.output, &ClassificationOutput::new(map, summary))?;
            info!("classification written to {}", cli.output.display());
        }

        Commands::Healthmap {
            input,
            index,
            band_a,
            band_b,
            soil_factor,
        } => {
            let (cube, ground_truth) = load_dataset(input)?;
            let mut session = Session::new();
            session.load_dataset(cube, ground_truth)?;

            let index: Box<dyn SpectralIndex> = match index.to_lowercase().as_str() {
                "ndvi" => Box::new(Ndvi::new(*band_a, *band_b, None)),
                "savi" => Box::new(Savi::new(*band_a, *band_b, *soil_factor, None)),
                other => anyhow::bail!("unknown index type: {}", other),
            };
            let map = session.health_map(index.as_ref())?;

            let output = if cli.float {
                HealthMapOutput::float(index.name(), &map)
            } else {
                HealthMapOutput::fixed_point(index.name(), &map, cli.scale_factor)
            };
            write_json(&cli.output, &output)?;
            info!("health map written to {}", cli.output.display());
        }

        Commands::Signature { input, row, col } => {
            let (cube, ground_truth) = load_dataset(input)?;
            let mut session = Session::new();
            session.load_dataset(cube, ground_truth)?;

            let spectral_signature = session.spectral_signature(*row, *col)?;
            write_json(
                &cli.output,
                &SignatureOutput {
                    row: *row,
                    col: *col,
                    spectral_signature,
                },
            )?;
            info!("signature written to {}", cli.output.display());
        }

        Commands::Sensors { hours, seed } => {
            let readings = generate_series(*hours, *seed);
            write_json(
                &cli.output,
                &SensorOutput {
                    hours: *hours,
                    readings,
                },
            )?;
            info!("sensor series written to {}", cli.output.display());
        }

        Commands::Batch { config } => process_batch(config)?,
    }

    Ok(())
}
