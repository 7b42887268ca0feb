use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array3;

use crop_classify::cube::Cube;
use crop_classify::processing::classify::{Classifier, InferenceEngine};
use crop_classify::processing::indices::{Ndvi, SpectralIndex};
use crop_classify::processing::patches::{PaddedCube, Patch};

fn synthetic_cube(height: usize, width: usize, bands: usize) -> Cube {
    let data = Array3::from_shape_fn((height, width, bands), |(r, c, b)| {
        ((r * 31 + c * 7 + b) % 97) as f32 / 97.0
    });
    Cube::new(data).expect("valid bench cube")
}

/// Cheap threshold stub so the benches measure engine overhead, not model
/// arithmetic.
struct ThresholdClassifier;

impl Classifier for ThresholdClassifier {
    fn predict(&self, batch: &[Patch<'_>]) -> anyhow::Result<Vec<u32>> {
        Ok(batch
            .iter()
            .map(|patch| {
                let (p, _, _) = patch.dim();
                u32::from(patch[[p / 2, p / 2, 0]] > 0.5)
            })
            .collect())
    }

    fn num_classes(&self) -> usize {
        2
    }

    fn name(&self) -> &str {
        "threshold"
    }
}

/// Benchmark the core NDVI calculation in isolation
fn benchmark_ndvi_calculation(c: &mut Criterion) {
    let cube = synthetic_cube(1024, 1024, 4);
    let ndvi = Ndvi::new(3, 1, None);

    c.bench_function("ndvi_core_calculation", |b| {
        b.iter(|| ndvi.compute(black_box(&cube)).unwrap())
    });
}

/// Benchmark padded patch extraction across one full row
fn benchmark_patch_extraction(c: &mut Criterion) {
    let cube = synthetic_cube(128, 128, 32);
    let padded = PaddedCube::new(&cube, 11).unwrap();

    c.bench_function("patch_extraction_row", |b| {
        b.iter(|| {
            for col in 0..padded.width() {
                black_box(padded.patch(64, col).unwrap());
            }
        })
    });
}

/// Benchmark the full sliding-window classification loop
fn benchmark_classification(c: &mut Criterion) {
    let cube = synthetic_cube(64, 64, 16);
    let engine = InferenceEngine::new(7, 32, Some(4)).unwrap();

    c.bench_function("classify_64x64", |b| {
        b.iter(|| {
            engine
                .classify(black_box(&cube), &ThresholdClassifier)
                .unwrap()
        })
    });

    c.bench_function("classify_64x64_parallel", |b| {
        b.iter(|| {
            engine
                .classify_parallel(black_box(&cube), &ThresholdClassifier)
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    benchmark_ndvi_calculation,
    benchmark_patch_extraction,
    benchmark_classification
);
criterion_main!(benches);
