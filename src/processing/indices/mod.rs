// src/processing/indices/mod.rs
pub mod ndvi;
pub mod savi;

pub use ndvi::Ndvi;
pub use savi::Savi;

use serde::Serialize;

use crate::cube::{Cube, IndexMap};
use crate::error::{Error, Result};

/// Guards normalized-difference denominators against division by zero.
pub const EPS: f32 = 1e-10;

/// Default NIR/red band positions for 200-band AVIRIS-style cubes. These
/// are ordinary configuration: they are validated against the loaded
/// cube's band count before any math runs, never trusted.
pub const DEFAULT_NIR_BAND: usize = 50;
pub const DEFAULT_RED_BAND: usize = 29;

/// A per-pixel spectral index computed from cube bands.
///
/// Implementations are pure: no shared state, safe to run concurrently
/// with the classification path.
pub trait SpectralIndex: Send + Sync {
    fn compute(&self, cube: &Cube) -> Result<IndexMap>;

    /// Number of distinct bands the index reads.
    fn required_bands(&self) -> usize;

    fn name(&self) -> &str;
}

/// Band indices arrive as caller configuration; they are checked against
/// the loaded cube before any math runs.
pub(crate) fn check_band(cube: &Cube, band: usize, role: &str) -> Result<()> {
    if band >= cube.bands() {
        return Err(Error::Configuration(format!(
            "{} band index {} is out of range for a cube with {} bands",
            role,
            band,
            cube.bands()
        )));
    }
    Ok(())
}

/// Summary statistics over a computed index map.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub median: f32,
    pub std: f32,
}

impl IndexStats {
    pub fn from_map(map: &IndexMap) -> Self {
        let mut sorted: Vec<f32> = map.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let n = sorted.len();

        let mean = (sorted.iter().map(|&v| f64::from(v)).sum::<f64>() / n as f64) as f32;
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        let var = sorted
            .iter()
            .map(|&v| {
                let d = f64::from(v) - f64::from(mean);
                d * d
            })
            .sum::<f64>()
            / n as f64;

        Self {
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median,
            std: var.sqrt() as f32,
        }
    }
}
