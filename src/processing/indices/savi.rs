// src/processing/indices/savi.rs
use ndarray::Array2;
use rayon::prelude::*;

use crate::cube::{Cube, IndexMap};
use crate::error::{Error, Result};
use crate::processing::indices::{check_band, SpectralIndex, EPS};

/// Soil-adjusted vegetation index:
/// `((nir - red) / (nir + red + L)) * (1 + L)`, clamped to [-1, 1].
pub struct Savi {
    nir_band: usize,
    red_band: usize,
    soil_factor: f32,
    name: String,
}

impl Savi {
    pub fn new(nir_band: usize, red_band: usize, soil_factor: f32, name: Option<String>) -> Self {
        Self {
            nir_band,
            red_band,
            soil_factor,
            name: name.unwrap_or_else(|| "SAVI".to_string()),
        }
    }
}

impl SpectralIndex for Savi {
    fn compute(&self, cube: &Cube) -> Result<IndexMap> {
        check_band(cube, self.nir_band, "NIR")?;
        check_band(cube, self.red_band, "red")?;

        let (height, width, _) = cube.values().dim();
        let l = self.soil_factor;
        let mut result = vec![0.0f32; height * width];

        result.par_iter_mut().enumerate().for_each(|(i, px)| {
            let (row, col) = (i / width, i % width);
            let nir = cube.value(row, col, self.nir_band);
            let red = cube.value(row, col, self.red_band);

            let denominator = nir + red + l;
            *px = if denominator.abs() > EPS {
                (((nir - red) / denominator) * (1.0 + l)).max(-1.0).min(1.0)
            } else {
                0.0
            };
        });

        Array2::from_shape_vec((height, width), result)
            .map_err(|e| Error::Configuration(e.to_string()))
    }

    fn required_bands(&self) -> usize {
        2
    }

    fn name(&self) -> &str {
        &self.name
    }
}
