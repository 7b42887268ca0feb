// src/batch.rs
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::io::writer::{ClassificationOutput, HealthMapOutput};
use crate::io::{load_dataset, write_json};
use crate::processing::indices::{
    Ndvi, Savi, SpectralIndex, DEFAULT_NIR_BAND, DEFAULT_RED_BAND,
};
use crate::processing::InferenceEngine;
use crate::session::Session;

#[derive(Deserialize, Serialize, Debug)]
pub struct BatchConfig {
    #[serde(default)]
    pub global: GlobalParams,
    pub operations: Vec<Operation>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GlobalParams {
    #[serde(default = "default_patch_size")]
    pub patch_size: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub float: bool,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: i32,
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            patch_size: default_patch_size(),
            batch_size: default_batch_size(),
            float: false,
            scale_factor: default_scale_factor(),
            parallel: true,
        }
    }
}

fn default_patch_size() -> usize {
    11
}

fn default_batch_size() -> usize {
    128
}

fn default_scale_factor() -> i32 {
    10000
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Serialize, Debug)]
pub struct Operation {
    #[serde(rename = "type")]
    pub op_type: String,
    pub input: String,
    pub output: String,
    pub band_a: Option<usize>,
    pub band_b: Option<usize>,
    pub soil_factor: Option<f32>,
    pub patch_size: Option<usize>,
    pub batch_size: Option<usize>,
    pub float: Option<bool>,
    pub scale_factor: Option<i32>,
    pub parallel: Option<bool>,
}

pub fn process_batch(config_path: &PathBuf) -> Result<()> {
    // Read and parse configuration file
    let config_content = fs::read_to_string(config_path)?;
    let config: BatchConfig = serde_json::from_str(&config_content)?;

    info!(
        "starting batch processing with {} operations",
        config.operations.len()
    );

    // Process each operation
    for (i, op) in config.operations.iter().enumerate() {
        info!(
            "[{}/{}] processing {} -> {}",
            i + 1,
            config.operations.len(),
            op.op_type,
            op.output
        );

        // Get parameters, with operation-specific overrides
        let float = op.float.unwrap_or(config.global.float);
        let scale_factor = op.scale_factor.unwrap_or(config.global.scale_factor);
        let patch_size = op.patch_size.unwrap_or(config.global.patch_size);
        let batch_size = op.batch_size.unwrap_or(config.global.batch_size);
        let parallel = op.parallel.unwrap_or(config.global.parallel);

        match op.op_type.to_lowercase().as_str() {
            "classify" => {
                let (cube, ground_truth) = load_dataset(Path::new(&op.input))?;
                let mut session = Session::new();
                session.load_dataset(cube, ground_truth)?;
                session.fit_centroid_classifier()?;

                let engine = InferenceEngine::new(patch_size, batch_size, None)?;
                let (map, summary) = session.run_analysis(&engine, parallel)?;
                write_json(
                    Path::new(&op.output),
                    &ClassificationOutput::new(map, summary),
                )?;
            }
            "ndvi" => {
                let index = Ndvi::new(
                    op.band_a.unwrap_or(DEFAULT_NIR_BAND),
                    op.band_b.unwrap_or(DEFAULT_RED_BAND),
                    None,
                );
                run_index_operation(op, &index, float, scale_factor)?;
            }
            "savi" => {
                let index = Savi::new(
                    op.band_a.unwrap_or(DEFAULT_NIR_BAND),
                    op.band_b.unwrap_or(DEFAULT_RED_BAND),
                    op.soil_factor.unwrap_or(0.5),
                    None,
                );
                run_index_operation(op, &index, float, scale_factor)?;
            }
            _ => return Err(anyhow::anyhow!("unknown operation type: {}", op.op_type)),
        }
    }

    info!("batch processing complete");
    Ok(())
}

fn run_index_operation(
    op: &Operation,
    index: &dyn SpectralIndex,
    float: bool,
    scale_factor: i32,
) -> Result<()> {
    let (cube, ground_truth) = load_dataset(Path::new(&op.input))?;
    let mut session = Session::new();
    session.load_dataset(cube, ground_truth)?;

    let map = session.health_map(index)?;
    let output = if float {
        HealthMapOutput::float(index.name(), &map)
    } else {
        HealthMapOutput::fixed_point(index.name(), &map, scale_factor)
    };
    write_json(Path::new(&op.output), &output)
}
