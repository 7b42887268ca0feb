// src/cube.rs
use ndarray::{s, Array2, Array3};

use crate::error::{Error, Result};

/// Per-pixel class labels as stored on disk: 0 is unlabeled background,
/// 1..=C are class identifiers.
pub type GroundTruth = Array2<u32>;

/// Per-pixel 1-indexed class identifiers produced by a classification run.
pub type PredictionMap = Array2<u32>;

/// Per-pixel spectral index values in [-1, 1].
pub type IndexMap = Array2<f32>;

/// A hyperspectral data cube with axes (row, column, band).
///
/// The backing array is always in standard row-major layout, so patch
/// views taken from a padded copy are contiguous slices.
#[derive(Debug, Clone)]
pub struct Cube {
    data: Array3<f32>,
}

impl Cube {
    pub fn new(data: Array3<f32>) -> Result<Self> {
        let (height, width, bands) = data.dim();
        if height == 0 || width == 0 || bands == 0 {
            return Err(Error::Configuration(format!(
                "cube must be non-empty, got {}x{}x{}",
                height, width, bands
            )));
        }
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Ok(Self { data })
    }

    /// Builds a cube from a row-major flattened value sequence, the layout
    /// used by the JSON dataset interchange.
    pub fn from_flat(height: usize, width: usize, bands: usize, values: Vec<f32>) -> Result<Self> {
        let expected = height * width * bands;
        if values.len() != expected {
            return Err(Error::Configuration(format!(
                "expected {} values for a {}x{}x{} cube, got {}",
                expected,
                height,
                width,
                bands,
                values.len()
            )));
        }
        let data = Array3::from_shape_vec((height, width, bands), values)
            .map_err(|e| Error::Configuration(e.to_string()))?;
        Self::new(data)
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn bands(&self) -> usize {
        self.data.dim().2
    }

    pub fn values(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn into_values(self) -> Array3<f32> {
        self.data
    }

    pub fn value(&self, row: usize, col: usize, band: usize) -> f32 {
        self.data[[row, col, band]]
    }

    /// Full per-band vector at one pixel of the stored cube.
    pub fn signature(&self, row: usize, col: usize) -> Result<Vec<f32>> {
        let (height, width, _) = self.data.dim();
        if row >= height || col >= width {
            return Err(Error::OutOfBounds {
                row,
                col,
                height,
                width,
            });
        }
        Ok(self.data.slice(s![row, col, ..]).to_vec())
    }
}

/// Validates that a ground-truth array shares the cube's spatial extent.
pub fn check_ground_truth(cube: &Cube, ground_truth: &GroundTruth) -> Result<()> {
    let (rows, cols) = ground_truth.dim();
    if rows != cube.height() || cols != cube.width() {
        return Err(Error::Configuration(format!(
            "ground truth extent {}x{} does not match cube extent {}x{}",
            rows,
            cols,
            cube.height(),
            cube.width()
        )));
    }
    Ok(())
}
