// src/session.rs
use tracing::info;

use crate::cube::{check_ground_truth, Cube, GroundTruth, IndexMap, PredictionMap};
use crate::error::{Error, Result};
use crate::processing::aggregate::{summarize, ClassCount};
use crate::processing::centroid::CentroidClassifier;
use crate::processing::classify::{Classifier, InferenceEngine};
use crate::processing::indices::SpectralIndex;
use crate::processing::normalize::normalize;

/// One analysis session: the normalized cube, its optional ground truth,
/// the installed classifier, and the last prediction map.
///
/// Operations take the session explicitly instead of reaching for ambient
/// globals, and loading a new cube invalidates any prediction computed
/// against the old one in the same step.
#[derive(Default)]
pub struct Session {
    cube: Option<Cube>,
    ground_truth: Option<GroundTruth>,
    classifier: Option<Box<dyn Classifier + Send + Sync>>,
    prediction: Option<PredictionMap>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes and installs a freshly loaded cube. Any previously
    /// computed prediction map refers to the replaced cube and is dropped
    /// here; the raw cube is not retained.
    pub fn load_dataset(&mut self, raw: Cube, ground_truth: Option<GroundTruth>) -> Result<()> {
        let cube = normalize(raw)?;
        if let Some(gt) = &ground_truth {
            check_ground_truth(&cube, gt)?;
        }
        info!(
            height = cube.height(),
            width = cube.width(),
            bands = cube.bands(),
            labeled = ground_truth.is_some(),
            "dataset loaded"
        );
        self.cube = Some(cube);
        self.ground_truth = ground_truth;
        self.prediction = None;
        Ok(())
    }

    pub fn cube(&self) -> Result<&Cube> {
        self.cube.as_ref().ok_or(Error::MissingCube)
    }

    pub fn ground_truth(&self) -> Option<&GroundTruth> {
        self.ground_truth.as_ref()
    }

    pub fn set_classifier(&mut self, classifier: Box<dyn Classifier + Send + Sync>) {
        self.classifier = Some(classifier);
    }

    /// Fits a nearest-centroid classifier from the loaded cube and ground
    /// truth and installs it. Returns the number of fitted classes.
    pub fn fit_centroid_classifier(&mut self) -> Result<usize> {
        let cube = self.cube.as_ref().ok_or(Error::MissingCube)?;
        let ground_truth = self.ground_truth.as_ref().ok_or_else(|| {
            Error::Configuration(
                "dataset has no ground truth; cannot fit a classifier".to_string(),
            )
        })?;
        let model = CentroidClassifier::fit(cube, ground_truth)?;
        let fitted = model.fitted_classes();
        self.classifier = Some(Box::new(model));
        Ok(fitted)
    }

    /// Classifies the loaded cube with the installed classifier, stores
    /// the resulting map as the session's current prediction, and returns
    /// it together with its class summary.
    pub fn run_analysis(
        &mut self,
        engine: &InferenceEngine,
        parallel: bool,
    ) -> Result<(&PredictionMap, Vec<ClassCount>)> {
        let cube = self.cube.as_ref().ok_or(Error::MissingCube)?;
        let classifier = self.classifier.as_deref().ok_or(Error::MissingClassifier)?;

        let map = if parallel {
            engine.classify_parallel(cube, classifier)?
        } else {
            engine.classify(cube, classifier)?
        };
        let summary = summarize(&map);
        let stored: &PredictionMap = self.prediction.insert(map);
        Ok((stored, summary))
    }

    pub fn prediction(&self) -> Option<&PredictionMap> {
        self.prediction.as_ref()
    }

    /// Full per-band vector at one pixel of the stored normalized cube.
    pub fn spectral_signature(&self, row: usize, col: usize) -> Result<Vec<f32>> {
        self.cube()?.signature(row, col)
    }

    /// Computes a spectral index map over the loaded cube. Independent of
    /// the classification path.
    pub fn health_map(&self, index: &dyn SpectralIndex) -> Result<IndexMap> {
        index.compute(self.cube()?)
    }
}
