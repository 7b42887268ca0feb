// src/processing/centroid.rs
use anyhow::anyhow;
use tracing::info;

use crate::cube::{check_ground_truth, Cube, GroundTruth};
use crate::error::{Error, Result};
use crate::processing::classify::Classifier;
use crate::processing::patches::Patch;

/// Spectral nearest-centroid classifier.
///
/// Fits one mean spectrum per labeled class from the ground-truth pixels
/// of a normalized cube, and predicts the class whose centroid is closest
/// (squared distance) to the mean spectrum of a patch. Deterministic and
/// dependency-free, it stands in for the opaque pretrained model the
/// pipeline is otherwise pointed at.
pub struct CentroidClassifier {
    /// (0-indexed class, mean spectrum) for every class with labeled
    /// support. Classes absent from the ground truth are never emitted.
    centroids: Vec<(u32, Vec<f32>)>,
    bands: usize,
    num_classes: usize,
}

impl CentroidClassifier {
    pub fn fit(cube: &Cube, ground_truth: &GroundTruth) -> Result<Self> {
        check_ground_truth(cube, ground_truth)?;
        let bands = cube.bands();

        let max_class = ground_truth.iter().copied().max().unwrap_or(0);
        if max_class == 0 {
            return Err(Error::Configuration(
                "ground truth contains no labeled pixels".to_string(),
            ));
        }

        let mut sums = vec![vec![0f64; bands]; max_class as usize];
        let mut counts = vec![0usize; max_class as usize];
        for ((row, col), &label) in ground_truth.indexed_iter() {
            if label == 0 {
                continue;
            }
            // stored labels are 1-indexed; the internal table is 0-indexed
            let k = (label - 1) as usize;
            counts[k] += 1;
            for band in 0..bands {
                sums[k][band] += f64::from(cube.value(row, col, band));
            }
        }

        let centroids: Vec<(u32, Vec<f32>)> = sums
            .into_iter()
            .zip(counts)
            .enumerate()
            .filter(|(_, (_, count))| *count > 0)
            .map(|(k, (sum, count))| {
                let mean = sum.iter().map(|&s| (s / count as f64) as f32).collect();
                (k as u32, mean)
            })
            .collect();

        info!(
            classes = centroids.len(),
            bands, "fitted nearest-centroid classifier"
        );
        Ok(Self {
            centroids,
            bands,
            num_classes: max_class as usize,
        })
    }

    pub fn fitted_classes(&self) -> usize {
        self.centroids.len()
    }

    fn nearest(&self, spectrum: &[f32]) -> u32 {
        let mut best_class = self.centroids[0].0;
        let mut best_dist = f32::INFINITY;
        for (class, centroid) in &self.centroids {
            let dist: f32 = centroid
                .iter()
                .zip(spectrum)
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            if dist < best_dist {
                best_dist = dist;
                best_class = *class;
            }
        }
        best_class
    }
}

impl Classifier for CentroidClassifier {
    fn predict(&self, batch: &[Patch<'_>]) -> anyhow::Result<Vec<u32>> {
        let mut labels = Vec::with_capacity(batch.len());
        for patch in batch {
            let (rows, cols, bands) = patch.dim();
            if bands != self.bands {
                return Err(anyhow!(
                    "patch has {} bands, classifier was fitted on {}",
                    bands,
                    self.bands
                ));
            }
            let mut mean = vec![0f32; bands];
            for ((_, _, band), &v) in patch.indexed_iter() {
                mean[band] += v;
            }
            let pixels = (rows * cols) as f32;
            for m in &mut mean {
                *m /= pixels;
            }
            labels.push(self.nearest(&mean));
        }
        Ok(labels)
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn expected_bands(&self) -> Option<usize> {
        Some(self.bands)
    }

    fn name(&self) -> &str {
        "nearest-centroid"
    }
}
