// src/error.rs
use thiserror::Error;

/// Failure kinds surfaced by the classification pipeline and session.
///
/// Every variant maps to a distinct caller-visible condition so an API
/// layer can report "load the data first" separately from "the model
/// itself failed". Nothing here retries; retry is a caller policy.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no hyperspectral cube loaded; load a dataset first")]
    MissingCube,

    #[error("no classifier loaded; install or fit a model first")]
    MissingClassifier,

    #[error("cube values are constant ({value}); cannot rescale a degenerate cube")]
    DegenerateCube { value: f32 },

    #[error("pixel ({row}, {col}) is outside the {height}x{width} cube extent")]
    OutOfBounds {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },

    #[error("classifier failed during batch inference")]
    Inference(#[source] anyhow::Error),

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;
