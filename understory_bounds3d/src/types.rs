// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive bounding types: axis-aligned boxes and spheres.

use glam::{DMat4, DVec3};

use crate::util::uniform_scale;

/// Axis-aligned bounding box in 3D.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3D {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl Aabb3D {
    /// Create a new AABB from min/max corners.
    ///
    /// The corners are taken as given; use [`Aabb3D::from_corners`] when the
    /// ordering is not known.
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from two arbitrary opposite corners, sorting per axis.
    pub fn from_corners(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB from its center and half extents.
    pub fn from_center_half_extents(center: DVec3, half: DVec3) -> Self {
        let half = half.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// The smallest AABB enclosing all points, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        Some(it.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        }))
    }

    /// Center of the box.
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Half extents of the box (zero on inverted axes).
    pub fn half_extents(&self) -> DVec3 {
        ((self.max - self.min) * 0.5).max(DVec3::ZERO)
    }

    /// Return true if the box is inverted on any axis. Assumes no NaN.
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Whether the box contains the point (boundary inclusive).
    pub fn contains_point(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Whether two boxes overlap (touching counts).
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Union of two boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Squared distance from a point to the box (zero inside).
    pub fn distance_squared_to_point(&self, p: DVec3) -> f64 {
        let clamped = p.clamp(self.min, self.max);
        p.distance_squared(clamped)
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [DVec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            DVec3::new(a.x, a.y, a.z),
            DVec3::new(b.x, a.y, a.z),
            DVec3::new(a.x, b.y, a.z),
            DVec3::new(b.x, b.y, a.z),
            DVec3::new(a.x, a.y, b.z),
            DVec3::new(b.x, a.y, b.z),
            DVec3::new(a.x, b.y, b.z),
            DVec3::new(b.x, b.y, b.z),
        ]
    }

    /// Conservative AABB of this box under an affine transform.
    pub fn transformed(&self, m: &DMat4) -> Self {
        // Arvo's method: accumulate per-axis extents of the rotated half vectors.
        let center = m.transform_point3(self.center());
        let half = self.half_extents();
        let extent = m.x_axis.truncate().abs() * half.x
            + m.y_axis.truncate().abs() * half.y
            + m.z_axis.truncate().abs() * half.z;
        Self::from_center_half_extents(center, extent)
    }

    /// Sphere enclosing this box.
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.center(), self.half_extents().length())
    }
}

/// Bounding sphere in 3D.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingSphere {
    /// Center of the sphere.
    pub center: DVec3,
    /// Radius of the sphere (non-negative).
    pub radius: f64,
}

impl BoundingSphere {
    /// Create a sphere; negative radii are clamped to zero.
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Whether the sphere contains the point (boundary inclusive).
    pub fn contains_point(&self, p: DVec3) -> bool {
        self.center.distance_squared(p) <= self.radius * self.radius
    }

    /// Whether two spheres overlap.
    pub fn intersects(&self, other: &Self) -> bool {
        let r = self.radius + other.radius;
        self.center.distance_squared(other.center) <= r * r
    }

    /// Whether the sphere overlaps an AABB.
    pub fn intersects_aabb(&self, aabb: &Aabb3D) -> bool {
        aabb.distance_squared_to_point(self.center) <= self.radius * self.radius
    }

    /// Sphere under an affine transform; non-uniform scales use the largest axis scale.
    pub fn transformed(&self, m: &DMat4) -> Self {
        Self::new(m.transform_point3(self.center), self.radius * uniform_scale(m))
    }

    /// Axis-aligned box enclosing the sphere.
    pub fn aabb(&self) -> Aabb3D {
        Aabb3D::from_center_half_extents(self.center, DVec3::splat(self.radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_sort_per_axis() {
        let b = Aabb3D::from_corners(DVec3::new(1.0, -1.0, 5.0), DVec3::new(-1.0, 1.0, 2.0));
        assert_eq!(b.min, DVec3::new(-1.0, -1.0, 2.0));
        assert_eq!(b.max, DVec3::new(1.0, 1.0, 5.0));
        assert!(!b.is_empty());
    }

    #[test]
    fn transformed_box_covers_rotated_corners() {
        let b = Aabb3D::new(DVec3::splat(-1.0), DVec3::splat(1.0));
        let m = DMat4::from_rotation_z(core::f64::consts::FRAC_PI_4)
            * DMat4::from_translation(DVec3::new(3.0, 0.0, 0.0));
        let t = b.transformed(&m);
        for c in b.corners() {
            let p = m.transform_point3(c);
            assert!(
                t.contains_point(p) || t.distance_squared_to_point(p) < 1e-18,
                "corner {p:?} outside {t:?}"
            );
        }
    }

    #[test]
    fn sphere_vs_box() {
        let b = Aabb3D::new(DVec3::ZERO, DVec3::ONE);
        assert!(BoundingSphere::new(DVec3::new(1.5, 0.5, 0.5), 0.6).intersects_aabb(&b));
        assert!(!BoundingSphere::new(DVec3::new(2.0, 2.0, 2.0), 1.0).intersects_aabb(&b));
    }

    #[test]
    fn from_points_encloses_all() {
        let pts = [
            DVec3::new(0.0, 2.0, -1.0),
            DVec3::new(-3.0, 1.0, 4.0),
            DVec3::new(1.0, -5.0, 0.0),
        ];
        let b = Aabb3D::from_points(pts).unwrap();
        assert_eq!(b.min, DVec3::new(-3.0, -5.0, -1.0));
        assert_eq!(b.max, DVec3::new(1.0, 2.0, 4.0));
        assert!(Aabb3D::from_points(core::iter::empty()).is_none());
    }
}
