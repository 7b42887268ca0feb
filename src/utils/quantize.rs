// src/utils/quantize.rs

/// Quantizes [-1, 1] index values to i16 at the given scale factor.
/// Values are clamped just inside the unit range so the scaled result
/// never overflows the target type.
pub fn to_fixed_point(values: &[f32], scale_factor: i32) -> Vec<i16> {
    values
        .iter()
        .map(|&value| {
            let clamped = value.max(-0.9999).min(0.9999);
            (clamped * scale_factor as f32).round() as i16
        })
        .collect()
}
