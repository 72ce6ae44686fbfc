// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Probe shapes without a natural bounding-volume form: cones and cylinders.

use glam::DVec3;

use crate::types::{Aabb3D, BoundingSphere};

/// A solid cylinder given by its center, unit axis, half height and radius.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cylinder {
    /// Center of the cylinder (midpoint of the axis).
    pub center: DVec3,
    /// Unit axis direction.
    pub axis: DVec3,
    /// Half of the axis length.
    pub half_height: f64,
    /// Radius.
    pub radius: f64,
}

impl Cylinder {
    /// Create a cylinder spanning `start` to `end`.
    ///
    /// Returns `None` when the axis has zero (or non-finite) length.
    pub fn from_endpoints(start: DVec3, end: DVec3, radius: f64) -> Option<Self> {
        let axis = end - start;
        let height = axis.length();
        if !(height.is_finite() && height > 0.0) {
            return None;
        }
        Some(Self {
            center: (start + end) * 0.5,
            axis: axis / height,
            half_height: height * 0.5,
            radius: radius.max(0.0),
        })
    }

    /// Split `p - center` into (axial, radial) distances.
    fn decompose(&self, p: DVec3) -> (f64, f64) {
        let v = p - self.center;
        let axial = v.dot(self.axis);
        let radial = (v - self.axis * axial).length();
        (axial, radial)
    }

    /// Whether the point lies inside the cylinder (boundary inclusive).
    pub fn contains_point(&self, p: DVec3) -> bool {
        let (axial, radial) = self.decompose(p);
        axial.abs() <= self.half_height && radial <= self.radius
    }

    /// Exact sphere overlap test.
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        let (axial, radial) = self.decompose(sphere.center);
        let dr = (radial - self.radius).max(0.0);
        let da = (axial.abs() - self.half_height).max(0.0);
        dr * dr + da * da <= sphere.radius * sphere.radius
    }

    /// Axis-aligned box enclosing the cylinder.
    pub fn aabb(&self) -> Aabb3D {
        let a = self.axis;
        let disc = DVec3::new(
            (1.0 - a.x * a.x).max(0.0).sqrt(),
            (1.0 - a.y * a.y).max(0.0).sqrt(),
            (1.0 - a.z * a.z).max(0.0).sqrt(),
        );
        let extent = a.abs() * self.half_height + disc * self.radius;
        Aabb3D::from_center_half_extents(self.center, extent)
    }

    /// Conservative box overlap test.
    ///
    /// Both the cylinder's own AABB and the box's bounding sphere must overlap;
    /// false positives are possible near edges, false negatives are not.
    pub fn intersects_aabb(&self, aabb: &Aabb3D) -> bool {
        self.aabb().intersects(aabb) && self.intersects_sphere(&aabb.bounding_sphere())
    }
}

/// An infinite, one-sided cone given by its vertex, unit axis and half angle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cone {
    /// Apex of the cone.
    pub vertex: DVec3,
    /// Unit axis direction.
    pub axis: DVec3,
    /// Half angle in radians, in `[0, PI]`.
    pub half_angle: f64,
    cos: f64,
    sin: f64,
}

impl Cone {
    /// Create a cone. Returns `None` for a zero or non-finite axis.
    pub fn new(vertex: DVec3, direction: DVec3, half_angle: f64) -> Option<Self> {
        let axis = direction.try_normalize()?;
        let half_angle = half_angle.clamp(0.0, core::f64::consts::PI);
        Some(Self {
            vertex,
            axis,
            half_angle,
            cos: half_angle.cos(),
            sin: half_angle.sin(),
        })
    }

    /// Whether the point lies inside the cone.
    pub fn contains_point(&self, p: DVec3) -> bool {
        let v = p - self.vertex;
        let len = v.length();
        if len == 0.0 {
            return true;
        }
        v.dot(self.axis) >= len * self.cos
    }

    /// Exact sphere overlap test.
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        let v = sphere.center - self.vertex;
        if v.length_squared() <= sphere.radius * sphere.radius {
            return true;
        }
        let axial = v.dot(self.axis);
        let radial = (v - self.axis * axial).length();
        // Signed distance to the lateral surface in the (axial, radial) half-plane.
        let lateral = radial * self.cos - axial * self.sin;
        if lateral > sphere.radius {
            return false;
        }
        // Behind the apex the nearest cone point is the vertex, already rejected above.
        axial * self.cos + radial * self.sin >= 0.0
    }

    /// Conservative box overlap test through the box's bounding sphere.
    pub fn intersects_aabb(&self, aabb: &Aabb3D) -> bool {
        self.contains_point(aabb.center()) || self.intersects_sphere(&aabb.bounding_sphere())
    }
}
