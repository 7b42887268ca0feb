// src/processing/aggregate.rs
use itertools::Itertools;
use serde::Serialize;

use crate::cube::PredictionMap;

/// One row of a classification summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassCount {
    pub class_id: u32,
    pub pixel_count: usize,
}

/// Pixel counts for every distinct class in a prediction map, ascending by
/// class identifier. The background/unlabeled sentinel 0 is dropped
/// unconditionally. Ground-truth arrays use the same encoding, so this
/// works on them as well.
pub fn summarize(map: &PredictionMap) -> Vec<ClassCount> {
    map.iter()
        .copied()
        .filter(|&class| class != 0)
        .counts()
        .into_iter()
        .sorted_by_key(|&(class_id, _)| class_id)
        .map(|(class_id, pixel_count)| ClassCount {
            class_id,
            pixel_count,
        })
        .collect()
}
