//! Numeric helpers for pixel conversion.

/// Truncates a pixel coordinate toward zero.
///
/// Non-finite values map to 0 and out-of-range values saturate.
pub(crate) fn trunc_coord(value: f32) -> i32 {
    value as i32
}

/// Truncates a pixel extent toward zero, clamping negative extents to 0.
pub(crate) fn trunc_extent(value: f32) -> u32 {
    value as u32
}
