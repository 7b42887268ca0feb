// tests/pipeline_tests.rs
use anyhow::anyhow;
use ndarray::{Array2, Array3};

use crop_classify::cube::Cube;
use crop_classify::error::Error;
use crop_classify::processing::aggregate::summarize;
use crop_classify::processing::centroid::CentroidClassifier;
use crop_classify::processing::classify::{Classifier, InferenceEngine, SerialClassifier};
use crop_classify::processing::indices::{IndexStats, Ndvi, Savi, SpectralIndex};
use crop_classify::processing::normalize::normalize;
use crop_classify::processing::patches::{PaddedCube, Patch};
use crop_classify::sensor::generate_series;
use crop_classify::session::Session;
use crop_classify::utils::quantize::to_fixed_point;

/// Helper to build a cube from a per-element function
fn make_cube(
    height: usize,
    width: usize,
    bands: usize,
    f: impl Fn(usize, usize, usize) -> f32,
) -> Cube {
    let data = Array3::from_shape_fn((height, width, bands), |(r, c, b)| f(r, c, b));
    Cube::new(data).expect("valid test cube")
}

/// Stub that always predicts the same 0-indexed class.
struct ConstantClassifier {
    class: u32,
    num_classes: usize,
}

impl Classifier for ConstantClassifier {
    fn predict(&self, batch: &[Patch<'_>]) -> anyhow::Result<Vec<u32>> {
        Ok(vec![self.class; batch.len()])
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn name(&self) -> &str {
        "constant"
    }
}

/// Stub that reads the center-pixel value of band 0 back out of each
/// patch, so tests can verify the exact patch-to-pixel mapping.
struct CenterValueClassifier {
    num_classes: usize,
}

impl Classifier for CenterValueClassifier {
    fn predict(&self, batch: &[Patch<'_>]) -> anyhow::Result<Vec<u32>> {
        Ok(batch
            .iter()
            .map(|patch| {
                let (p, _, _) = patch.dim();
                patch[[p / 2, p / 2, 0]].round() as u32
            })
            .collect())
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn name(&self) -> &str {
        "center-value"
    }
}

/// Stub whose every invocation fails.
struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn predict(&self, _batch: &[Patch<'_>]) -> anyhow::Result<Vec<u32>> {
        Err(anyhow!("sensor head offline"))
    }

    fn num_classes(&self) -> usize {
        4
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Stub that breaks the batch-length contract.
struct ShortBatchClassifier;

impl Classifier for ShortBatchClassifier {
    fn predict(&self, batch: &[Patch<'_>]) -> anyhow::Result<Vec<u32>> {
        Ok(vec![0; batch.len().saturating_sub(1)])
    }

    fn num_classes(&self) -> usize {
        4
    }

    fn name(&self) -> &str {
        "short-batch"
    }
}

#[test]
fn test_normalize_rescales_to_unit_range() {
    let cube = make_cube(6, 5, 3, |r, c, b| 40.0 + (r * 15 + c * 3 + b) as f32);
    let normalized = normalize(cube).unwrap();

    let min = normalized.values().iter().cloned().fold(f32::INFINITY, f32::min);
    let max = normalized
        .values()
        .iter()
        .cloned()
        .fold(f32::NEG_INFINITY, f32::max);

    assert!(min.abs() < 1e-6, "expected min 0.0, got {}", min);
    assert!((max - 1.0).abs() < 1e-6, "expected max 1.0, got {}", max);
}

#[test]
fn test_normalize_rejects_constant_cube() {
    let cube = make_cube(4, 4, 2, |_, _, _| 3.25);
    let err = normalize(cube).unwrap_err();
    assert!(matches!(err, Error::DegenerateCube { .. }), "got {:?}", err);
}

#[test]
fn test_patch_shape_and_edge_padding() {
    let cube = make_cube(5, 5, 3, |_, _, _| 1.0);
    let padded = PaddedCube::new(&cube, 3).unwrap();

    // corner pixel: the out-of-image neighbors must be zero
    let corner = padded.patch(0, 0).unwrap();
    assert_eq!(corner.dim(), (3, 3, 3));
    for b in 0..3 {
        assert_eq!(corner[[0, 0, b]], 0.0);
        assert_eq!(corner[[0, 2, b]], 0.0);
        assert_eq!(corner[[2, 0, b]], 0.0);
        assert_eq!(corner[[1, 1, b]], 1.0);
    }

    // interior pixel: no padding visible
    let interior = padded.patch(2, 2).unwrap();
    assert_eq!(interior.dim(), (3, 3, 3));
    assert!(interior.iter().all(|&v| v == 1.0));
}

#[test]
fn test_patch_rejects_even_or_zero_size() {
    let cube = make_cube(5, 5, 2, |_, _, _| 1.0);
    assert!(matches!(
        PaddedCube::new(&cube, 4),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        PaddedCube::new(&cube, 0),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_patch_out_of_bounds() {
    let cube = make_cube(5, 5, 2, |_, _, _| 1.0);
    let padded = PaddedCube::new(&cube, 3).unwrap();
    assert!(matches!(
        padded.patch(5, 0),
        Err(Error::OutOfBounds { row: 5, col: 0, .. })
    ));
    assert!(matches!(padded.patch(0, 7), Err(Error::OutOfBounds { .. })));
}

#[test]
fn test_classify_constant_stub_fills_map() {
    let cube = make_cube(4, 4, 3, |_, _, _| 0.5);
    let classifier = ConstantClassifier {
        class: 2,
        num_classes: 5,
    };
    let engine = InferenceEngine::new(3, 8, None).unwrap();

    let map = engine.classify(&cube, &classifier).unwrap();
    assert_eq!(map.dim(), (4, 4));
    // 0-indexed model output 2 becomes stored class 3
    assert!(map.iter().all(|&v| v == 3));
}

#[test]
fn test_classify_spatial_mapping_with_ragged_batches() {
    let (height, width) = (4, 5);
    let cube = make_cube(height, width, 2, |r, c, _| (r * width + c) as f32);
    let classifier = CenterValueClassifier {
        num_classes: height * width,
    };
    // batch size 3 over width 5 leaves a short final chunk per row
    let engine = InferenceEngine::new(3, 3, None).unwrap();

    let map = engine.classify(&cube, &classifier).unwrap();
    for r in 0..height {
        for c in 0..width {
            assert_eq!(map[[r, c]], (r * width + c) as u32 + 1);
        }
    }
}

#[test]
fn test_classify_parallel_matches_sequential() {
    let (height, width) = (9, 7);
    let cube = make_cube(height, width, 3, |r, c, _| (r * width + c) as f32);
    let classifier = CenterValueClassifier {
        num_classes: height * width,
    };
    let engine = InferenceEngine::new(3, 4, Some(4)).unwrap();

    let sequential = engine.classify(&cube, &classifier).unwrap();
    let parallel = engine.classify_parallel(&cube, &classifier).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_serial_wrapper_behaves_like_inner() {
    let (height, width) = (5, 5);
    let cube = make_cube(height, width, 2, |r, c, _| (r * width + c) as f32);
    let engine = InferenceEngine::new(3, 4, Some(2)).unwrap();

    let plain = engine
        .classify(
            &cube,
            &CenterValueClassifier {
                num_classes: height * width,
            },
        )
        .unwrap();
    let wrapped = SerialClassifier::new(CenterValueClassifier {
        num_classes: height * width,
    });
    let serial = engine.classify_parallel(&cube, &wrapped).unwrap();
    assert_eq!(plain, serial);
}

#[test]
fn test_classifier_failure_aborts_run() {
    let cube = make_cube(4, 4, 2, |_, _, _| 0.5);
    let engine = InferenceEngine::new(3, 8, None).unwrap();

    let err = engine.classify(&cube, &FailingClassifier).unwrap_err();
    assert!(matches!(err, Error::Inference(_)), "got {:?}", err);

    let err = engine
        .classify_parallel(&cube, &FailingClassifier)
        .unwrap_err();
    assert!(matches!(err, Error::Inference(_)), "got {:?}", err);
}

#[test]
fn test_classifier_contract_violations_are_inference_errors() {
    let cube = make_cube(4, 4, 2, |_, _, _| 0.5);
    let engine = InferenceEngine::new(3, 8, None).unwrap();

    // too few labels for the batch
    let err = engine.classify(&cube, &ShortBatchClassifier).unwrap_err();
    assert!(matches!(err, Error::Inference(_)));

    // label outside the declared class range
    let out_of_range = ConstantClassifier {
        class: 7,
        num_classes: 3,
    };
    let err = engine.classify(&cube, &out_of_range).unwrap_err();
    assert!(matches!(err, Error::Inference(_)));
}

#[test]
fn test_engine_rejects_bad_configuration() {
    assert!(matches!(
        InferenceEngine::new(4, 8, None),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        InferenceEngine::new(3, 0, None),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_summarize_counts_sorted_without_background() {
    let map = Array2::from_shape_vec((2, 4), vec![0, 2, 1, 2, 2, 1, 0, 3]).unwrap();
    let summary = summarize(&map);

    let ids: Vec<u32> = summary.iter().map(|c| c.class_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let counts: Vec<usize> = summary.iter().map(|c| c.pixel_count).collect();
    assert_eq!(counts, vec![2, 3, 1]);

    let non_background = map.iter().filter(|&&v| v != 0).count();
    assert_eq!(counts.iter().sum::<usize>(), non_background);
}

#[test]
fn test_ndvi_known_values_and_bounds() {
    // band pairs per pixel: (0.8, 0.2), (0.5, 0.5), (0.0, 0.0), (0.0, 0.6)
    let pairs = [(0.8, 0.2), (0.5, 0.5), (0.0, 0.0), (0.0, 0.6)];
    let cube = make_cube(1, 4, 2, |_, c, b| {
        if b == 0 {
            pairs[c].0
        } else {
            pairs[c].1
        }
    });

    let map = Ndvi::new(0, 1, None).compute(&cube).unwrap();
    assert!((map[[0, 0]] - 0.6).abs() < 1e-4);
    assert_eq!(map[[0, 1]], 0.0);
    // zero-sum denominator is guarded, not NaN
    assert_eq!(map[[0, 2]], 0.0);
    assert!((map[[0, 3]] + 1.0).abs() < 1e-4);
    assert!(map.iter().all(|v| (-1.0..=1.0).contains(v)));
}

#[test]
fn test_ndvi_rejects_out_of_range_band() {
    let cube = make_cube(2, 2, 2, |_, _, b| b as f32);
    let err = Ndvi::new(0, 7, None).compute(&cube).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn test_savi_known_value() {
    let cube = make_cube(1, 1, 2, |_, _, b| if b == 0 { 0.8 } else { 0.2 });

    // ((0.8 - 0.2) / (0.8 + 0.2 + 0.5)) * 1.5 = 0.6
    let map = Savi::new(0, 1, 0.5, None).compute(&cube).unwrap();
    assert!((map[[0, 0]] - 0.6).abs() < 1e-4);

    // L = 0 reduces to the plain normalized difference
    let map = Savi::new(0, 1, 0.0, None).compute(&cube).unwrap();
    assert!((map[[0, 0]] - 0.6).abs() < 1e-4);
}

#[test]
fn test_index_stats() {
    let map = Array2::from_shape_vec((1, 4), vec![-1.0, 0.0, 0.5, 1.0]).unwrap();
    let stats = IndexStats::from_map(&map);
    assert_eq!(stats.min, -1.0);
    assert_eq!(stats.max, 1.0);
    assert!((stats.mean - 0.125).abs() < 1e-6);
    assert!((stats.median - 0.25).abs() < 1e-6);
}

#[test]
fn test_session_requires_cube() {
    let mut session = Session::new();
    let engine = InferenceEngine::new(3, 8, None).unwrap();

    let err = session.run_analysis(&engine, false).unwrap_err();
    assert!(matches!(err, Error::MissingCube), "got {:?}", err);

    let err = session.spectral_signature(0, 0).unwrap_err();
    assert!(matches!(err, Error::MissingCube));
}

#[test]
fn test_session_requires_classifier() {
    let mut session = Session::new();
    session
        .load_dataset(make_cube(4, 4, 2, |r, c, b| (r + c + b) as f32), None)
        .unwrap();

    let engine = InferenceEngine::new(3, 8, None).unwrap();
    let err = session.run_analysis(&engine, false).unwrap_err();
    assert!(matches!(err, Error::MissingClassifier), "got {:?}", err);
}

#[test]
fn test_session_signature_lookup() {
    let mut session = Session::new();
    // values r + c + b over a 5x5x4 cube; global max is 11
    session
        .load_dataset(make_cube(5, 5, 4, |r, c, b| (r + c + b) as f32), None)
        .unwrap();

    let signature = session.spectral_signature(0, 0).unwrap();
    assert_eq!(signature.len(), 4);
    for (b, &v) in signature.iter().enumerate() {
        assert!((v - b as f32 / 11.0).abs() < 1e-6);
    }

    let err = session.spectral_signature(5, 0).unwrap_err();
    assert!(matches!(err, Error::OutOfBounds { row: 5, col: 0, .. }));
}

#[test]
fn test_session_reload_invalidates_prediction() {
    let mut session = Session::new();
    session
        .load_dataset(make_cube(4, 4, 2, |r, c, b| (r + c + b) as f32), None)
        .unwrap();
    session.set_classifier(Box::new(ConstantClassifier {
        class: 0,
        num_classes: 2,
    }));

    let engine = InferenceEngine::new(3, 8, None).unwrap();
    session.run_analysis(&engine, false).unwrap();
    assert!(session.prediction().is_some());

    session
        .load_dataset(make_cube(3, 3, 2, |r, c, b| (r * c + b) as f32), None)
        .unwrap();
    assert!(session.prediction().is_none());
}

#[test]
fn test_centroid_classifier_recovers_regions() {
    // left half and right half carry opposite two-band spectra
    let cube = make_cube(4, 4, 2, |_, c, b| {
        let left = c < 2;
        match (left, b) {
            (true, 0) | (false, 1) => 1.0,
            _ => 0.0,
        }
    });
    let ground_truth = Array2::from_shape_fn((4, 4), |(_, c)| if c < 2 { 1 } else { 2 });

    let model = CentroidClassifier::fit(&cube, &ground_truth).unwrap();
    assert_eq!(model.fitted_classes(), 2);

    // patch size 1 keeps each prediction on the pixel's own spectrum
    let engine = InferenceEngine::new(1, 4, None).unwrap();
    let map = engine.classify(&cube, &model).unwrap();
    assert_eq!(map, ground_truth);
}

#[test]
fn test_centroid_fit_requires_labels() {
    let cube = make_cube(3, 3, 2, |r, c, b| (r + c + b) as f32);
    let empty = Array2::zeros((3, 3));
    assert!(matches!(
        CentroidClassifier::fit(&cube, &empty),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_sensor_series_shape_and_bounds() {
    let readings = generate_series(48, Some(42));
    assert_eq!(readings.len(), 48);

    for reading in &readings {
        assert!((0.0..=100.0).contains(&reading.humidity_pct));
        assert!((0.0..=100.0).contains(&reading.soil_moisture_pct));
        assert!((10.0..=45.0).contains(&reading.temperature_c));
    }
}

#[test]
fn test_sensor_series_is_seed_deterministic() {
    let a = generate_series(24, Some(7));
    let b = generate_series(24, Some(7));

    let temps_a: Vec<f32> = a.iter().map(|r| r.temperature_c).collect();
    let temps_b: Vec<f32> = b.iter().map(|r| r.temperature_c).collect();
    assert_eq!(temps_a, temps_b);
}

#[test]
fn test_fixed_point_quantization() {
    let quantized = to_fixed_point(&[-1.0, -0.5, 0.0, 0.5, 1.0], 10000);
    assert_eq!(quantized, vec![-9999, -5000, 0, 5000, 9999]);
}
