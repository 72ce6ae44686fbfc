// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`BoundingVolume`] sum type and its probe predicates.
//!
//! Predicates are conservative: they may report an overlap that the exact
//! geometry would not, but never miss one.

use glam::{DMat4, DVec3};

use crate::shapes::{Cone, Cylinder};
use crate::types::{Aabb3D, BoundingSphere};

/// A bounding volume usable as pickable bounds.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum BoundingVolume {
    /// Encloses nothing; never intersects.
    #[default]
    Empty,
    /// Encloses everything; always intersects (entry parameter 0).
    Infinite,
    /// Axis-aligned box.
    Box(Aabb3D),
    /// Sphere.
    Sphere(BoundingSphere),
}

impl From<Aabb3D> for BoundingVolume {
    fn from(value: Aabb3D) -> Self {
        Self::Box(value)
    }
}

impl From<BoundingSphere> for BoundingVolume {
    fn from(value: BoundingSphere) -> Self {
        Self::Sphere(value)
    }
}

impl BoundingVolume {
    /// Center of the volume, if it has one.
    pub fn center(&self) -> Option<DVec3> {
        match self {
            Self::Box(b) if !b.is_empty() => Some(b.center()),
            Self::Sphere(s) => Some(s.center),
            _ => None,
        }
    }

    /// Axis-aligned box enclosing the volume, if finite and non-empty.
    pub fn aabb(&self) -> Option<Aabb3D> {
        match self {
            Self::Box(b) if !b.is_empty() => Some(*b),
            Self::Sphere(s) => Some(s.aabb()),
            _ => None,
        }
    }

    /// True for [`BoundingVolume::Empty`] and inverted boxes.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Box(b) => b.is_empty(),
            _ => false,
        }
    }

    /// Smallest volume of a reasonable kind enclosing both.
    pub fn union(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Infinite, _) | (_, Self::Infinite) => Self::Infinite,
            (a, b) if a.is_empty() => *b,
            (a, b) if b.is_empty() => *a,
            (Self::Sphere(a), Self::Sphere(b)) => Self::Sphere(enclosing_sphere(a, b)),
            (a, b) => match (a.aabb(), b.aabb()) {
                (Some(x), Some(y)) => Self::Box(x.union(&y)),
                (Some(x), None) | (None, Some(x)) => Self::Box(x),
                (None, None) => Self::Empty,
            },
        }
    }

    /// The volume under an affine transform (conservative for boxes).
    pub fn transformed(&self, m: &DMat4) -> Self {
        match self {
            Self::Box(b) if !b.is_empty() => Self::Box(b.transformed(m)),
            Self::Sphere(s) => Self::Sphere(s.transformed(m)),
            other => *other,
        }
    }

    /// Whether the volume contains the point.
    pub fn contains_point(&self, p: DVec3) -> bool {
        match self {
            Self::Empty => false,
            Self::Infinite => true,
            Self::Box(b) => b.contains_point(p),
            Self::Sphere(s) => s.contains_point(p),
        }
    }

    /// Parametric entry of the ray `origin + t * direction`, `t >= 0`.
    ///
    /// `direction` need not be normalized; the parameter is expressed in
    /// multiples of it, which keeps it invariant under affine transforms of the ray.
    pub fn ray_entry(&self, origin: DVec3, direction: DVec3) -> Option<f64> {
        self.line_entry(origin, direction, f64::INFINITY)
    }

    /// Parametric entry of the segment `start -> end`, in `[0, 1]`.
    pub fn segment_entry(&self, start: DVec3, end: DVec3) -> Option<f64> {
        self.line_entry(start, end - start, 1.0)
    }

    fn line_entry(&self, origin: DVec3, direction: DVec3, t_max: f64) -> Option<f64> {
        match self {
            Self::Empty => None,
            Self::Infinite => Some(0.0),
            Self::Box(b) => slab_entry(b, origin, direction, t_max),
            Self::Sphere(s) => sphere_entry(s, origin, direction, t_max),
        }
    }

    /// Whether the volume overlaps the box.
    pub fn intersects_aabb(&self, aabb: &Aabb3D) -> bool {
        match self {
            Self::Empty => false,
            Self::Infinite => !aabb.is_empty(),
            Self::Box(b) => b.intersects(aabb),
            Self::Sphere(s) => s.intersects_aabb(aabb),
        }
    }

    /// Whether the volume overlaps the sphere.
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        match self {
            Self::Empty => false,
            Self::Infinite => true,
            Self::Box(b) => sphere.intersects_aabb(b),
            Self::Sphere(s) => s.intersects(sphere),
        }
    }

    /// Whether the volume overlaps the cylinder.
    pub fn intersects_cylinder(&self, cylinder: &Cylinder) -> bool {
        match self {
            Self::Empty => false,
            Self::Infinite => true,
            Self::Box(b) => !b.is_empty() && cylinder.intersects_aabb(b),
            Self::Sphere(s) => cylinder.intersects_sphere(s),
        }
    }

    /// Whether the volume overlaps the cone.
    pub fn intersects_cone(&self, cone: &Cone) -> bool {
        match self {
            Self::Empty => false,
            Self::Infinite => true,
            Self::Box(b) => !b.is_empty() && cone.intersects_aabb(b),
            Self::Sphere(s) => cone.intersects_sphere(s),
        }
    }
}

fn enclosing_sphere(a: &BoundingSphere, b: &BoundingSphere) -> BoundingSphere {
    let d = b.center - a.center;
    let dist = d.length();
    if dist + b.radius <= a.radius {
        return *a;
    }
    if dist + a.radius <= b.radius {
        return *b;
    }
    let radius = (dist + a.radius + b.radius) * 0.5;
    let center = a.center + d * ((radius - a.radius) / dist);
    BoundingSphere::new(center, radius)
}

fn slab_entry(b: &Aabb3D, origin: DVec3, direction: DVec3, t_max: f64) -> Option<f64> {
    if b.is_empty() {
        return None;
    }
    let mut t0 = 0.0_f64;
    let mut t1 = t_max;
    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let (lo, hi) = (b.min[axis], b.max[axis]);
        if d == 0.0 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (mut near, mut far) = ((lo - o) * inv, (hi - o) * inv);
        if near > far {
            core::mem::swap(&mut near, &mut far);
        }
        t0 = t0.max(near);
        t1 = t1.min(far);
        if t0 > t1 {
            return None;
        }
    }
    Some(t0)
}

fn sphere_entry(s: &BoundingSphere, origin: DVec3, direction: DVec3, t_max: f64) -> Option<f64> {
    let oc = origin - s.center;
    let c = oc.length_squared() - s.radius * s.radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let a = direction.length_squared();
    if a == 0.0 {
        return None;
    }
    let half_b = direction.dot(oc);
    let disc = half_b * half_b - a * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-half_b - disc.sqrt()) / a;
    (t >= 0.0 && t <= t_max).then_some(t)
}
