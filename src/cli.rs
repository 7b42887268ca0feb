// src/cli.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::processing::indices::{DEFAULT_NIR_BAND, DEFAULT_RED_BAND};

#[derive(Parser)]
#[command(name = "crop-classify")]
#[command(about = "Patch-based crop classification and spectral indices for hyperspectral cubes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output file path
    #[arg(short, long, default_value = "output.json", global = true)]
    pub output: PathBuf,

    /// Emit raw float32 index values instead of int16
    #[arg(long, global = true)]
    pub float: bool,

    /// Scaling factor for fixed-point index output
    #[arg(long, default_value = "10000", global = true)]
    pub scale_factor: i32,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every pixel with a centroid model fitted from the
    /// dataset's ground truth
    Classify {
        /// Dataset file (JSON cube interchange)
        input: PathBuf,

        /// Spatial patch size (odd)
        #[arg(long, default_value = "11")]
        patch_size: usize,

        /// Patches per classifier invocation
        #[arg(long, default_value = "128")]
        batch_size: usize,

        /// Row workers for parallel classification (default: CPU count)
        #[arg(long)]
        workers: Option<usize>,

        /// Classify rows on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Vegetation health map from two spectral bands
    Healthmap {
        /// Dataset file (JSON cube interchange)
        input: PathBuf,

        /// Index type: ndvi or savi
        #[arg(long, default_value = "ndvi")]
        index: String,

        /// NIR band index
        #[arg(short = 'a', long, default_value_t = DEFAULT_NIR_BAND)]
        band_a: usize,

        /// Red band index
        #[arg(short = 'b', long, default_value_t = DEFAULT_RED_BAND)]
        band_b: usize,

        /// Soil adjustment factor (SAVI only)
        #[arg(short = 'l', long, default_value = "0.5")]
        soil_factor: f32,
    },

    /// Per-band spectral signature of one pixel
    Signature {
        /// Dataset file (JSON cube interchange)
        input: PathBuf,

        #[arg(long)]
        row: usize,

        #[arg(long)]
        col: usize,
    },

    /// Simulated field-sensor time series
    Sensors {
        /// Hours to simulate
        #[arg(long, default_value = "24")]
        hours: u32,

        /// Fixed RNG seed for a reproducible series
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run a JSON batch configuration
    Batch {
        /// Batch configuration file
        config: PathBuf,
    },
}
