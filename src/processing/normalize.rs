// src/processing/normalize.rs
use ndarray::Array3;
use rayon::prelude::*;
use tracing::debug;

use crate::cube::Cube;
use crate::error::{Error, Result};

/// Rescales a raw cube so its global minimum maps to 0.0 and its global
/// maximum to 1.0.
///
/// The min/max are taken over the entire cube, not per band. A constant
/// cube (max == min), or one whose extrema are poisoned by NaN, fails with
/// `DegenerateCube` instead of letting NaNs flow downstream. Consumes the
/// raw cube; the caller keeps only the normalized result.
pub fn normalize(cube: Cube) -> Result<Cube> {
    let dim = cube.values().raw_dim();
    let (mut flat, _) = cube.into_values().into_raw_vec_and_offset();

    let (min, max) = flat
        .par_iter()
        .fold(
            || (f32::INFINITY, f32::NEG_INFINITY),
            |(lo, hi), &v| (lo.min(v), hi.max(v)),
        )
        .reduce(
            || (f32::INFINITY, f32::NEG_INFINITY),
            |(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)),
        );

    if !(max > min) {
        return Err(Error::DegenerateCube { value: min });
    }

    debug!(min, max, "rescaling cube to [0, 1]");
    let range = max - min;
    flat.par_iter_mut().for_each(|v| *v = (*v - min) / range);

    Cube::new(Array3::from_shape_vec(dim, flat).map_err(|e| Error::Configuration(e.to_string()))?)
}
