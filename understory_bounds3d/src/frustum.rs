// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Six-plane view frustum.
//!
//! Planes are stored as `(a, b, c, d)` with inward-facing normals: a point `p`
//! is inside a plane when `a * p.x + b * p.y + c * p.z + d >= 0`.

use glam::{DMat4, DVec3, DVec4};

use crate::types::{Aabb3D, BoundingSphere};
use crate::volume::BoundingVolume;

/// A convex volume bounded by six planes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far.
    pub planes: [DVec4; 6],
}

impl Frustum {
    /// Create a frustum from six inward-facing planes; planes are normalized.
    pub fn new(planes: [DVec4; 6]) -> Self {
        Self {
            planes: planes.map(normalize_plane),
        }
    }

    /// Create a frustum from 24 packed coefficients (six `a, b, c, d` groups).
    pub fn from_packed(packed: &[f64; 24]) -> Self {
        let mut planes = [DVec4::ZERO; 6];
        for (plane, chunk) in planes.iter_mut().zip(packed.chunks_exact(4)) {
            *plane = DVec4::new(chunk[0], chunk[1], chunk[2], chunk[3]);
        }
        Self::new(planes)
    }

    /// Pack the planes into 24 coefficients.
    pub fn to_packed(&self) -> [f64; 24] {
        let mut out = [0.0; 24];
        for (chunk, plane) in out.chunks_exact_mut(4).zip(self.planes.iter()) {
            chunk.copy_from_slice(&plane.to_array());
        }
        out
    }

    /// Extract the frustum of a view-projection matrix with a `[0, 1]` depth range.
    pub fn from_view_projection(m: &DMat4) -> Self {
        let (r0, r1, r2, r3) = (m.row(0), m.row(1), m.row(2), m.row(3));
        Self::new([r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2])
    }

    /// Whether the point lies inside every plane.
    pub fn contains_point(&self, p: DVec3) -> bool {
        self.planes.iter().all(|pl| signed_distance(*pl, p) >= 0.0)
    }

    /// Whether the world-space box overlaps the frustum (conservative).
    pub fn intersects_aabb(&self, aabb: &Aabb3D) -> bool {
        !aabb.is_empty() && self.planes.iter().all(|pl| box_not_outside(*pl, aabb))
    }

    /// Whether the world-space sphere overlaps the frustum (conservative).
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.planes
            .iter()
            .all(|pl| signed_distance(*pl, sphere.center) >= -sphere.radius)
    }

    /// Classify a volume given in object space against the world-space planes.
    ///
    /// `object_to_world` maps the volume's coordinates into the frustum's space.
    /// Boxes are tested against the planes pulled into object space, which
    /// avoids the AABB growth of transforming the box itself.
    pub fn intersects_volume(&self, volume: &BoundingVolume, object_to_world: &DMat4) -> bool {
        match volume {
            BoundingVolume::Empty => false,
            BoundingVolume::Infinite => true,
            BoundingVolume::Box(b) => {
                if b.is_empty() {
                    return false;
                }
                let to_object = object_to_world.transpose();
                self.planes
                    .iter()
                    .all(|pl| box_not_outside(to_object * *pl, b))
            }
            BoundingVolume::Sphere(s) => self.intersects_sphere(&s.transformed(object_to_world)),
        }
    }
}

fn normalize_plane(p: DVec4) -> DVec4 {
    let len = p.truncate().length();
    if len > 0.0 { p / len } else { p }
}

fn signed_distance(plane: DVec4, p: DVec3) -> f64 {
    plane.truncate().dot(p) + plane.w
}

/// The box is outside the plane only if its most positive vertex is.
fn box_not_outside(plane: DVec4, b: &Aabb3D) -> bool {
    let n = plane.truncate();
    let positive = DVec3::select(n.cmpge(DVec3::ZERO), b.max, b.min);
    signed_distance(plane, positive) >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Axis-aligned cube `[-s, s]^3` expressed as a frustum.
    fn cube(s: f64) -> Frustum {
        Frustum::new([
            DVec4::new(1.0, 0.0, 0.0, s),
            DVec4::new(-1.0, 0.0, 0.0, s),
            DVec4::new(0.0, 1.0, 0.0, s),
            DVec4::new(0.0, -1.0, 0.0, s),
            DVec4::new(0.0, 0.0, 1.0, s),
            DVec4::new(0.0, 0.0, -1.0, s),
        ])
    }

    #[test]
    fn packed_round_trip() {
        let f = cube(3.0);
        assert_eq!(Frustum::from_packed(&f.to_packed()), f);
    }

    #[test]
    fn box_and_sphere_classification() {
        let f = cube(1.0);
        assert!(f.contains_point(DVec3::new(0.5, -0.5, 0.9)));
        assert!(!f.contains_point(DVec3::new(1.5, 0.0, 0.0)));
        assert!(f.intersects_aabb(&Aabb3D::new(DVec3::splat(0.5), DVec3::splat(3.0))));
        assert!(!f.intersects_aabb(&Aabb3D::new(DVec3::splat(2.0), DVec3::splat(3.0))));
        assert!(f.intersects_sphere(&BoundingSphere::new(DVec3::new(1.5, 0.0, 0.0), 0.6)));
        assert!(!f.intersects_sphere(&BoundingSphere::new(DVec3::new(1.5, 0.0, 0.0), 0.4)));
    }

    #[test]
    fn volume_uses_object_to_world() {
        let f = cube(1.0);
        let local = BoundingVolume::Box(Aabb3D::new(DVec3::splat(-0.1), DVec3::splat(0.1)));
        assert!(f.intersects_volume(&local, &DMat4::IDENTITY));
        let far = DMat4::from_translation(DVec3::new(5.0, 0.0, 0.0));
        assert!(!f.intersects_volume(&local, &far));
        let near_edge = DMat4::from_translation(DVec3::new(1.05, 0.0, 0.0));
        assert!(f.intersects_volume(&local, &near_edge));
        let sphere = BoundingVolume::Sphere(BoundingSphere::new(DVec3::ZERO, 0.1));
        assert!(!f.intersects_volume(&sphere, &far));
        assert!(f.intersects_volume(&sphere, &near_edge));
    }

    #[test]
    fn view_projection_extraction() {
        let proj = DMat4::perspective_rh(core::f64::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let view = DMat4::look_at_rh(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0), DVec3::Y);
        let f = Frustum::from_view_projection(&(proj * view));
        assert!(f.contains_point(DVec3::new(0.0, 0.0, -10.0)));
        assert!(!f.contains_point(DVec3::new(0.0, 0.0, 10.0)));
        assert!(!f.contains_point(DVec3::new(0.0, 0.0, -200.0)));
        assert!(!f.contains_point(DVec3::new(20.0, 0.0, -10.0)));
    }
}
