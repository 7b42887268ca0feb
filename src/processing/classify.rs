// src/processing/classify.rs
use anyhow::anyhow;
use ndarray::Array2;
use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cube::{Cube, PredictionMap};
use crate::error::{Error, Result};
use crate::processing::patches::{PaddedCube, Patch};

/// The prediction capability the pipeline consumes. Model internals stay
/// behind this seam, so tests and the CLI can plug in anything from a
/// constant stub to a fitted spectral model.
pub trait Classifier: Send {
    /// Classifies an ordered batch of same-shape patches, returning one
    /// 0-indexed class per patch, in input order.
    fn predict(&self, batch: &[Patch<'_>]) -> anyhow::Result<Vec<u32>>;

    /// Number of classes the model can emit; output indices lie in
    /// `0..num_classes`.
    fn num_classes(&self) -> usize;

    /// Band count the model was built for, when it has one.
    fn expected_bands(&self) -> Option<usize> {
        None
    }

    fn name(&self) -> &str;
}

/// Serializes access to a classifier that does not support concurrent
/// invocation, so it can still back the parallel row pipeline.
pub struct SerialClassifier<C> {
    inner: Mutex<C>,
    name: String,
}

impl<C: Classifier> SerialClassifier<C> {
    pub fn new(inner: C) -> Self {
        let name = format!("serial({})", inner.name());
        Self {
            inner: Mutex::new(inner),
            name,
        }
    }

    pub fn into_inner(self) -> C {
        self.inner.into_inner()
    }
}

impl<C: Classifier> Classifier for SerialClassifier<C> {
    fn predict(&self, batch: &[Patch<'_>]) -> anyhow::Result<Vec<u32>> {
        self.inner.lock().predict(batch)
    }

    fn num_classes(&self) -> usize {
        self.inner.lock().num_classes()
    }

    fn expected_bands(&self) -> Option<usize> {
        self.inner.lock().expected_bands()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Row-by-row, batch-by-batch sliding-window inference over a cube.
///
/// The cube is padded once, then each row's patches are built
/// left-to-right and fed to the classifier in `batch_size` chunks (the
/// last chunk may be short). Only one row's patches are alive at a time.
/// A classifier failure aborts the whole run; no partial map escapes.
pub struct InferenceEngine {
    patch_size: usize,
    batch_size: usize,
    workers: usize,
}

impl InferenceEngine {
    pub fn new(patch_size: usize, batch_size: usize, workers: Option<usize>) -> Result<Self> {
        if patch_size == 0 || patch_size % 2 == 0 {
            return Err(Error::Configuration(format!(
                "patch size must be odd and nonzero, got {}",
                patch_size
            )));
        }
        if batch_size == 0 {
            return Err(Error::Configuration(
                "batch size must be nonzero".to_string(),
            ));
        }
        let workers = workers.unwrap_or_else(num_cpus::get).max(1);
        Ok(Self {
            patch_size,
            batch_size,
            workers,
        })
    }

    pub fn patch_size(&self) -> usize {
        self.patch_size
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Classifies every pixel of the cube, top-to-bottom.
    pub fn classify<C>(&self, cube: &Cube, classifier: &C) -> Result<PredictionMap>
    where
        C: Classifier + ?Sized,
    {
        let padded = self.prepare(cube, classifier)?;
        let mut map = Array2::zeros((padded.height(), padded.width()));

        for row in 0..padded.height() {
            let labels = self.classify_row(&padded, classifier, row)?;
            for (col, label) in labels.into_iter().enumerate() {
                map[[row, col]] = label;
            }
        }
        Ok(map)
    }

    /// Same result as [`classify`](Self::classify), with rows fanned out
    /// across a worker pool. Each worker owns disjoint rows and results
    /// are keyed by row index on the channel, so assembly order does not
    /// matter and the output is identical to the sequential path.
    pub fn classify_parallel<C>(&self, cube: &Cube, classifier: &C) -> Result<PredictionMap>
    where
        C: Classifier + Sync + ?Sized,
    {
        let padded = self.prepare(cube, classifier)?;
        let (height, width) = (padded.height(), padded.width());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        let (tx, rx) = flume::unbounded();
        let run: Result<()> = pool.install(|| {
            (0..height)
                .into_par_iter()
                .try_for_each_with(tx, |tx, row| {
                    let labels = self.classify_row(&padded, classifier, row)?;
                    let _ = tx.send((row, labels));
                    Ok(())
                })
        });
        // Rows already sitting in the channel die with the receiver on error.
        run?;

        let mut map = Array2::zeros((height, width));
        for (row, labels) in rx {
            for (col, label) in labels.into_iter().enumerate() {
                map[[row, col]] = label;
            }
        }
        Ok(map)
    }

    fn prepare<C>(&self, cube: &Cube, classifier: &C) -> Result<PaddedCube>
    where
        C: Classifier + ?Sized,
    {
        if classifier.num_classes() == 0 {
            return Err(Error::Configuration(format!(
                "classifier '{}' reports zero classes",
                classifier.name()
            )));
        }
        if let Some(bands) = classifier.expected_bands() {
            if bands != cube.bands() {
                return Err(Error::Configuration(format!(
                    "classifier '{}' expects {} bands but the cube has {}",
                    classifier.name(),
                    bands,
                    cube.bands()
                )));
            }
        }
        info!(
            classifier = classifier.name(),
            patch_size = self.patch_size,
            batch_size = self.batch_size,
            "classifying {}x{}x{} cube",
            cube.height(),
            cube.width(),
            cube.bands()
        );
        PaddedCube::new(cube, self.patch_size)
    }

    /// Classifies one full row and returns its 1-indexed labels.
    ///
    /// This is the only place the classifier's 0-indexed output is shifted
    /// onto the 1-indexed numbering shared with ground truth, so the
    /// offset cannot drift between call sites.
    fn classify_row<C>(&self, padded: &PaddedCube, classifier: &C, row: usize) -> Result<Vec<u32>>
    where
        C: Classifier + ?Sized,
    {
        let width = padded.width();
        let mut patches = Vec::with_capacity(width);
        for col in 0..width {
            patches.push(padded.patch(row, col)?);
        }

        let num_classes = classifier.num_classes() as u32;
        let mut labels = Vec::with_capacity(width);
        for chunk in patches.chunks(self.batch_size) {
            let predicted = classifier.predict(chunk).map_err(Error::Inference)?;
            if predicted.len() != chunk.len() {
                return Err(Error::Inference(anyhow!(
                    "classifier returned {} labels for a batch of {}",
                    predicted.len(),
                    chunk.len()
                )));
            }
            if let Some(&bad) = predicted.iter().find(|&&l| l >= num_classes) {
                return Err(Error::Inference(anyhow!(
                    "classifier emitted class index {} outside 0..{}",
                    bad,
                    num_classes
                )));
            }
            labels.extend(predicted.into_iter().map(|l| l + 1));
        }
        debug!(row, "row classified");
        Ok(labels)
    }
}
