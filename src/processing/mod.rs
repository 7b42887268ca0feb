// src/processing/mod.rs
pub mod aggregate;
pub mod centroid;
pub mod classify;
pub mod indices;
pub mod normalize;
pub mod patches;

// Re-export main components
pub use aggregate::{summarize, ClassCount};
pub use centroid::CentroidClassifier;
pub use classify::{Classifier, InferenceEngine, SerialClassifier};
pub use normalize::normalize;
pub use patches::{PaddedCube, Patch};
