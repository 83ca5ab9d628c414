//! Hit tests in the flattened 2.5D arena
//!
//! The arena is not a real 3D space. Volumes are boxes in the x/z plane
//! (width along x, height along z) standing at a single depth `y`. Two
//! volumes touch when their x ranges and z bands intersect and their depths
//! are within a loose tolerance band, which keeps aiming forgiving.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// An axis-aligned hit volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    /// Left edge
    pub x: f32,
    /// Depth (front/back position, no extent)
    pub y: f32,
    /// Bottom edge (height above ground)
    pub z: f32,
    /// Extent along x
    pub w: f32,
    /// Extent along z
    pub h: f32,
}

impl Volume {
    pub fn new(x: f32, y: f32, z: f32, w: f32, h: f32) -> Self {
        Self { x, y, z, w, h }
    }

    /// A square volume of side `size` centered on `pos` in x and z
    pub fn centered(pos: Vec3, size: f32) -> Self {
        let half = size / 2.0;
        Self::new(pos.x - half, pos.y, pos.z - half, size, size)
    }
}

/// Plan-view (x, y) distance. Height is ignored: this is the range metric the
/// AI reasons with, not a precise 3D distance.
#[inline]
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(b.x - a.x, b.y - a.y).length()
}

/// Overlap test: z bands intersect (inclusive), x ranges intersect (strict),
/// and depths differ by less than `depth_tolerance`.
pub fn boxes_overlap(a: &Volume, b: &Volume, depth_tolerance: f32) -> bool {
    if a.z > b.z + b.h || b.z > a.z + a.h {
        return false;
    }
    a.x < b.x + b.w && a.x + a.w > b.x && (a.y - b.y).abs() < depth_tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TOL: f32 = 70.0;

    #[test]
    fn test_distance_ignores_height() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 500.0);
        assert!((distance(a, b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_overlap_basic() {
        let fighter = Volume::new(100.0, 400.0, 0.0, 55.0, 125.0);
        let ring = Volume::centered(Vec3::new(120.0, 420.0, 50.0), 16.0);
        assert!(boxes_overlap(&ring, &fighter, TOL));
    }

    #[test]
    fn test_depth_uses_tolerance_not_extent() {
        let a = Volume::new(0.0, 400.0, 0.0, 50.0, 100.0);
        let near = Volume::new(0.0, 469.0, 0.0, 50.0, 100.0);
        let far = Volume::new(0.0, 470.0, 0.0, 50.0, 100.0);
        assert!(boxes_overlap(&a, &near, TOL));
        assert!(!boxes_overlap(&a, &far, TOL));
        // A tighter tolerance turns the near case into a miss
        assert!(!boxes_overlap(&a, &near, 50.0));
    }

    #[test]
    fn test_height_band_touching_counts() {
        let low = Volume::new(0.0, 0.0, 0.0, 10.0, 10.0);
        let stacked = Volume::new(0.0, 0.0, 10.0, 10.0, 10.0);
        let above = Volume::new(0.0, 0.0, 10.5, 10.0, 10.0);
        assert!(boxes_overlap(&low, &stacked, TOL));
        assert!(!boxes_overlap(&low, &above, TOL));
    }

    #[test]
    fn test_x_edges_touching_miss() {
        let a = Volume::new(0.0, 0.0, 0.0, 10.0, 10.0);
        let b = Volume::new(10.0, 0.0, 0.0, 10.0, 10.0);
        assert!(!boxes_overlap(&a, &b, TOL));
    }

    fn volume() -> impl Strategy<Value = Volume> {
        (
            -500.0f32..1500.0,
            200.0f32..700.0,
            -50.0f32..300.0,
            1.0f32..200.0,
            1.0f32..200.0,
        )
            .prop_map(|(x, y, z, w, h)| Volume::new(x, y, z, w, h))
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(a in volume(), b in volume(), tol in 1.0f32..120.0) {
            prop_assert_eq!(boxes_overlap(&a, &b, tol), boxes_overlap(&b, &a, tol));
        }

        #[test]
        fn prop_distance_is_symmetric_and_flat(
            ax in -1000.0f32..1000.0, ay in -1000.0f32..1000.0, az in -100.0f32..100.0,
            bx in -1000.0f32..1000.0, by in -1000.0f32..1000.0, bz in -100.0f32..100.0,
        ) {
            let a = Vec3::new(ax, ay, az);
            let b = Vec3::new(bx, by, bz);
            prop_assert!((distance(a, b) - distance(b, a)).abs() < 1e-3);
            prop_assert!((distance(a, b) - distance(a, Vec3::new(bx, by, 0.0))).abs() < 1e-3);
        }
    }
}
