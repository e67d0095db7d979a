//! Float ordering and precision helpers.
//!
//! - `stable_total_cmp_f64` gives floats a deterministic total
//!   order, so sorts over heights or distances are reproducible.
//! - `CameraRelative` turns `f64` scene positions into `f32` offsets for
//!   vertex buffers.

use core::cmp::Ordering;

use super::Vec3;

/// `f32` position relative to a high-precision origin.
pub type CameraRelativeF32 = [f32; 3];

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraRelative {
    pub origin: Vec3,
}

impl CameraRelative {
    pub fn new(origin: Vec3) -> Self {
        Self { origin }
    }

    #[inline]
    pub fn to_f32(self, world: Vec3) -> CameraRelativeF32 {
        (world - self.origin).to_f32()
    }
}

/// Canonicalize a floating-point value for deterministic ordering.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Deterministic total ordering for floats.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

#[cfg(test)]
mod tests {
    use super::{CameraRelative, canonical_f64, stable_total_cmp_f64};
    use core::cmp::Ordering;

    use crate::math::Vec3;

    #[test]
    fn canonicalizes_negative_zero() {
        assert_eq!(canonical_f64(-0.0), 0.0);
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
    }

    #[test]
    fn nan_sorts_deterministically() {
        let mut heights = vec![3.0, f64::NAN, 1.0];
        heights.sort_by(|a, b| stable_total_cmp_f64(*a, *b));
        assert_eq!(heights[0], 1.0);
        assert_eq!(heights[1], 3.0);
        assert!(heights[2].is_nan());
    }

    #[test]
    fn camera_relative_offsets() {
        let origin = Vec3::new(100.0, -20.0, 5.0);
        let rel = CameraRelative::new(origin).to_f32(Vec3::new(101.25, -21.0, 4.5));
        assert_eq!(rel, [1.25, -1.0, -0.5]);
    }
}
