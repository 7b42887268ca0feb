// src/io/writer.rs
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cube::{IndexMap, PredictionMap};
use crate::processing::aggregate::ClassCount;
use crate::processing::indices::IndexStats;
use crate::sensor::SensorReading;
use crate::utils::quantize::to_fixed_point;

/// Classification results as callers consume them: a row-major flattened
/// map plus the per-class summary, never nested arrays.
#[derive(Serialize)]
pub struct ClassificationOutput {
    pub height: usize,
    pub width: usize,
    pub prediction_map: Vec<u32>,
    pub class_summary: Vec<ClassCount>,
}

impl ClassificationOutput {
    pub fn new(map: &PredictionMap, class_summary: Vec<ClassCount>) -> Self {
        let (height, width) = map.dim();
        Self {
            height,
            width,
            prediction_map: map.iter().copied().collect(),
            class_summary,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum HealthMapValues {
    Float(Vec<f32>),
    Fixed(Vec<i16>),
}

/// A computed index map with its summary statistics, either as raw floats
/// or quantized to i16 at `scale_factor`.
#[derive(Serialize)]
pub struct HealthMapOutput {
    pub index: String,
    pub height: usize,
    pub width: usize,
    pub stats: IndexStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_factor: Option<i32>,
    pub values: HealthMapValues,
}

impl HealthMapOutput {
    pub fn float(index: &str, map: &IndexMap) -> Self {
        let (height, width) = map.dim();
        Self {
            index: index.to_string(),
            height,
            width,
            stats: IndexStats::from_map(map),
            scale_factor: None,
            values: HealthMapValues::Float(map.iter().copied().collect()),
        }
    }

    pub fn fixed_point(index: &str, map: &IndexMap, scale_factor: i32) -> Self {
        let (height, width) = map.dim();
        let flat: Vec<f32> = map.iter().copied().collect();
        Self {
            index: index.to_string(),
            height,
            width,
            stats: IndexStats::from_map(map),
            scale_factor: Some(scale_factor),
            values: HealthMapValues::Fixed(to_fixed_point(&flat, scale_factor)),
        }
    }
}

#[derive(Serialize)]
pub struct SignatureOutput {
    pub row: usize,
    pub col: usize,
    pub spectral_signature: Vec<f32>,
}

#[derive(Serialize)]
pub struct SensorOutput {
    pub hours: u32,
    pub readings: Vec<SensorReading>,
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating output {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("writing output {}", path.display()))?;
    Ok(())
}
