// src/processing/patches.rs
use ndarray::{s, Array3, ArrayView3};

use crate::cube::Cube;
use crate::error::{Error, Result};

/// A fixed-size spatial neighborhood around one pixel, across all bands.
pub type Patch<'a> = ArrayView3<'a, f32>;

/// A cube with `patch_size / 2` zero-valued rows and columns added on each
/// spatial edge. Padding happens once here; every patch is then a plain
/// slice of the padded array, so edge pixels yield full-size patches whose
/// out-of-image region is all zeros. The band axis is never padded.
pub struct PaddedCube {
    data: Array3<f32>,
    height: usize,
    width: usize,
    patch_size: usize,
}

impl PaddedCube {
    pub fn new(cube: &Cube, patch_size: usize) -> Result<Self> {
        if patch_size == 0 || patch_size % 2 == 0 {
            return Err(Error::Configuration(format!(
                "patch size must be odd and nonzero, got {}",
                patch_size
            )));
        }
        let (height, width, bands) = cube.values().dim();
        let pad = patch_size / 2;

        let mut data = Array3::zeros((height + 2 * pad, width + 2 * pad, bands));
        data.slice_mut(s![pad..pad + height, pad..pad + width, ..])
            .assign(cube.values());

        Ok(Self {
            data,
            height,
            width,
            patch_size,
        })
    }

    /// Patch of shape (patch_size, patch_size, bands) centered at the real
    /// pixel (row, col). Coordinates are checked against the unpadded
    /// extent, so the slice below can never leave the padded bounds.
    pub fn patch(&self, row: usize, col: usize) -> Result<Patch<'_>> {
        if row >= self.height || col >= self.width {
            return Err(Error::OutOfBounds {
                row,
                col,
                height: self.height,
                width: self.width,
            });
        }
        let p = self.patch_size;
        Ok(self.data.slice(s![row..row + p, col..col + p, ..]))
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn bands(&self) -> usize {
        self.data.dim().2
    }

    pub fn patch_size(&self) -> usize {
        self.patch_size
    }
}
