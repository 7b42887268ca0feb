// src/io/reader.rs
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array2;
use serde::Deserialize;

use crate::cube::{Cube, GroundTruth};

/// On-disk dataset interchange: spatial/spectral dimensions plus the
/// row-major flattened cube values, with an optional flattened
/// ground-truth layer (0 = unlabeled, 1..=C = class ids).
#[derive(Deserialize)]
pub struct DatasetFile {
    pub height: usize,
    pub width: usize,
    pub bands: usize,
    pub values: Vec<f32>,
    #[serde(default)]
    pub ground_truth: Option<Vec<u32>>,
}

pub fn load_dataset(path: &Path) -> Result<(Cube, Option<GroundTruth>)> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading dataset {}", path.display()))?;
    let file: DatasetFile = serde_json::from_str(&content)
        .with_context(|| format!("parsing dataset {}", path.display()))?;

    let cube = Cube::from_flat(file.height, file.width, file.bands, file.values)?;
    let ground_truth = match file.ground_truth {
        Some(flat) => Some(
            Array2::from_shape_vec((file.height, file.width), flat)
                .context("ground truth length does not match the cube extent")?,
        ),
        None => None,
    };
    Ok((cube, ground_truth))
}
