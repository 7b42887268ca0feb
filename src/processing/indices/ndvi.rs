// src/processing/indices/ndvi.rs
use ndarray::Array2;
use rayon::prelude::*;

use crate::cube::{Cube, IndexMap};
use crate::error::{Error, Result};
use crate::processing::indices::{check_band, SpectralIndex, EPS};

/// Normalized-difference vegetation index over two cube bands:
/// `(a - b) / (a + b + EPS)`, clamped to [-1, 1].
pub struct Ndvi {
    band_a: usize,
    band_b: usize,
    name: String,
}

impl Ndvi {
    pub fn new(band_a: usize, band_b: usize, name: Option<String>) -> Self {
        Self {
            band_a,
            band_b,
            name: name.unwrap_or_else(|| "NDVI".to_string()),
        }
    }
}

impl SpectralIndex for Ndvi {
    fn compute(&self, cube: &Cube) -> Result<IndexMap> {
        check_band(cube, self.band_a, "first")?;
        check_band(cube, self.band_b, "second")?;

        let (height, width, _) = cube.values().dim();
        let mut result = vec![0.0f32; height * width];

        result.par_iter_mut().enumerate().for_each(|(i, px)| {
            let (row, col) = (i / width, i % width);
            let a = cube.value(row, col, self.band_a);
            let b = cube.value(row, col, self.band_b);
            *px = ((a - b) / (a + b + EPS)).max(-1.0).min(1.0);
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
