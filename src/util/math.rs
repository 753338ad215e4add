//! Math type re-exports and small helpers shared by the cameras and viewer.
//!
//! Vectors and matrices come from `glam`. The camera rigs are driven through
//! `dolly`, which speaks `mint`, so the conversions live here.

// Re-export glam types
pub use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Size of the preview surface in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero (or negative), i.e. nothing to map onto.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    #[inline]
    pub fn min_dimension(&self) -> f32 {
        self.width.min(self.height)
    }

    /// Width over height, 1.0 for an empty viewport.
    #[inline]
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width / self.height
        }
    }
}

/// 3D bounding box with single precision.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BBox3f {
    pub min: Vec3,
    pub max: Vec3,
}

impl BBox3f {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point. Non-finite points are skipped.
    #[inline]
    pub fn expand_by_point(&mut self, p: Vec3) {
        if !p.is_finite() {
            return;
        }
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Radius of the bounding sphere.
    #[inline]
    pub fn radius(&self) -> f32 {
        (self.max - self.min).length() * 0.5
    }
}

impl Default for BBox3f {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for BBox3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3f({:?} - {:?})", self.min, self.max)
    }
}

#[inline]
pub(crate) fn to_mint_point(v: Vec3) -> mint::Point3<f32> {
    mint::Point3 { x: v.x, y: v.y, z: v.z }
}

#[inline]
pub(crate) fn from_mint_point(p: mint::Point3<f32>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

#[inline]
pub(crate) fn to_mint_quat(q: Quat) -> mint::Quaternion<f32> {
    mint::Quaternion {
        v: mint::Vector3 { x: q.x, y: q.y, z: q.z },
        s: q.w,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport() {
        let vp = ViewportSize::new(1920.0, 1080.0);
        assert!(!vp.is_empty());
        assert_eq!(vp.min_dimension(), 1080.0);
        assert!((vp.aspect() - 16.0 / 9.0).abs() < 1e-6);

        assert!(ViewportSize::new(0.0, 100.0).is_empty());
        assert_eq!(ViewportSize::default().aspect(), 1.0);
    }

    #[test]
    fn test_bbox3f() {
        let mut b = BBox3f::EMPTY;
        assert!(b.is_empty());

        b.expand_by_point(Vec3::new(-1.0, -1.0, -1.0));
        b.expand_by_point(Vec3::new(f32::NAN, 0.0, 0.0));
        b.expand_by_point(Vec3::ONE);
        assert!(!b.is_empty());
        assert_eq!(b.center(), Vec3::ZERO);
        assert!((b.radius() - 3f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_mint_roundtrip() {
        let q = to_mint_quat(Quat::from_rotation_y(0.5));
        assert_eq!(Quat::from_xyzw(q.v.x, q.v.y, q.v.z, q.s), Quat::from_rotation_y(0.5));
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(from_mint_point(to_mint_point(p)), p);
    }
}
