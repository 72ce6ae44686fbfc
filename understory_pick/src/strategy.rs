// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-probe strategies: bounds test and transform propagation.
//!
//! A strategy is the probe expressed in the coordinates of the node being
//! visited. It is a small `Copy` value handed down by value, so siblings see
//! the parent-space probe again without any undo step.

use glam::{DMat4, DVec3};
use understory_bounds3d::{Aabb3D, BoundingSphere, BoundingVolume, Cone, Cylinder, Frustum};

use crate::node::LocalTransform;
use crate::types::ExactQuery;

/// A probe in the current node's coordinate space.
pub(crate) trait LocalProbe: Copy {
    /// Hits rank by line parameter, which also allows pruning in closest mode.
    const PARAMETRIC: bool = false;
    /// The probe stays in world space and the stack holds cumulative matrices.
    const CUMULATIVE: bool = false;

    /// Test parent-space bounds. Returns the entry parameter for line probes, `0` otherwise.
    fn test_bounds(&self, volume: &BoundingVolume) -> Option<f64>;

    /// The probe in the child coordinates of `transform`, or `None` if it degenerates.
    fn to_local(&self, transform: &LocalTransform) -> Option<Self>;

    /// Stack entry recorded for a level entered through `transform`.
    ///
    /// Called on the probe returned by [`to_local`](Self::to_local).
    fn level(&self, transform: &LocalTransform) -> DMat4 {
        *transform.forward()
    }

    /// Line query for leaves' exact geometry tests.
    fn exact(&self) -> Option<ExactQuery> {
        None
    }
}

fn hit(test: bool) -> Option<f64> {
    test.then_some(0.0)
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct PointProbe(pub(crate) DVec3);

impl LocalProbe for PointProbe {
    fn test_bounds(&self, volume: &BoundingVolume) -> Option<f64> {
        hit(volume.contains_point(self.0))
    }

    fn to_local(&self, transform: &LocalTransform) -> Option<Self> {
        Some(Self(transform.inverse().transform_point3(self.0)))
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct RayProbe {
    origin: DVec3,
    direction: DVec3,
}

impl RayProbe {
    pub(crate) fn new(origin: DVec3, direction: DVec3) -> Option<Self> {
        (direction.length_squared() > 0.0 && direction.is_finite())
            .then_some(Self { origin, direction })
    }
}

impl LocalProbe for RayProbe {
    const PARAMETRIC: bool = true;

    fn test_bounds(&self, volume: &BoundingVolume) -> Option<f64> {
        volume.ray_entry(self.origin, self.direction)
    }

    fn to_local(&self, transform: &LocalTransform) -> Option<Self> {
        let inv = transform.inverse();
        Self::new(
            inv.transform_point3(self.origin),
            inv.transform_vector3(self.direction),
        )
    }

    fn exact(&self) -> Option<ExactQuery> {
        Some(ExactQuery::Ray {
            origin: self.origin,
            direction: self.direction,
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct SegmentProbe {
    start: DVec3,
    end: DVec3,
}

impl SegmentProbe {
    pub(crate) fn new(start: DVec3, end: DVec3) -> Self {
        Self { start, end }
    }
}

impl LocalProbe for SegmentProbe {
    const PARAMETRIC: bool = true;

    fn test_bounds(&self, volume: &BoundingVolume) -> Option<f64> {
        volume.segment_entry(self.start, self.end)
    }

    fn to_local(&self, transform: &LocalTransform) -> Option<Self> {
        let inv = transform.inverse();
        Some(Self::new(
            inv.transform_point3(self.start),
            inv.transform_point3(self.end),
        ))
    }

    fn exact(&self) -> Option<ExactQuery> {
        Some(ExactQuery::Segment {
            start: self.start,
            end: self.end,
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct BoxProbe(pub(crate) Aabb3D);

impl LocalProbe for BoxProbe {
    fn test_bounds(&self, volume: &BoundingVolume) -> Option<f64> {
        hit(volume.intersects_aabb(&self.0))
    }

    // Only the two corners are carried; re-sorting keeps min <= max under reflections.
    fn to_local(&self, transform: &LocalTransform) -> Option<Self> {
        let inv = transform.inverse();
        Some(Self(Aabb3D::from_corners(
            inv.transform_point3(self.0.min),
            inv.transform_point3(self.0.max),
        )))
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct SphereProbe(pub(crate) BoundingSphere);

impl LocalProbe for SphereProbe {
    fn test_bounds(&self, volume: &BoundingVolume) -> Option<f64> {
        hit(volume.intersects_sphere(&self.0))
    }

    fn to_local(&self, transform: &LocalTransform) -> Option<Self> {
        Some(Self(BoundingSphere::new(
            transform.inverse().transform_point3(self.0.center),
            self.0.radius * transform.inverse_scale(),
        )))
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct CylinderProbe(pub(crate) Cylinder);

impl LocalProbe for CylinderProbe {
    fn test_bounds(&self, volume: &BoundingVolume) -> Option<f64> {
        hit(volume.intersects_cylinder(&self.0))
    }

    fn to_local(&self, transform: &LocalTransform) -> Option<Self> {
        let inv = transform.inverse();
        let c = self.0;
        let center = inv.transform_point3(c.center);
        let axis = inv.transform_vector3(c.axis * c.half_height);
        Cylinder::from_endpoints(
            center - axis,
            center + axis,
            c.radius * transform.inverse_scale(),
        )
        .map(Self)
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ConeProbe(pub(crate) Cone);

impl LocalProbe for ConeProbe {
    fn test_bounds(&self, volume: &BoundingVolume) -> Option<f64> {
        hit(volume.intersects_cone(&self.0))
    }

    fn to_local(&self, transform: &LocalTransform) -> Option<Self> {
        let inv = transform.inverse();
        let c = self.0;
        Cone::new(
            inv.transform_point3(c.vertex),
            inv.transform_vector3(c.axis),
            c.half_angle,
        )
        .map(Self)
    }
}

/// Frusta stay in world space; the strategy carries the cumulative matrix instead.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FrustumProbe {
    frustum: Frustum,
    cumulative: DMat4,
}

impl FrustumProbe {
    pub(crate) fn new(frustum: Frustum) -> Self {
        Self {
            frustum,
            cumulative: DMat4::IDENTITY,
        }
    }
}

impl LocalProbe for FrustumProbe {
    const CUMULATIVE: bool = true;

    fn test_bounds(&self, volume: &BoundingVolume) -> Option<f64> {
        hit(self.frustum.intersects_volume(volume, &self.cumulative))
    }

    fn to_local(&self, transform: &LocalTransform) -> Option<Self> {
        Some(Self {
            frustum: self.frustum,
            cumulative: self.cumulative * *transform.forward(),
        })
    }

    fn level(&self, _transform: &LocalTransform) -> DMat4 {
        self.cumulative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reflect_x() -> LocalTransform {
        LocalTransform::new(DMat4::from_scale(DVec3::new(-1.0, 1.0, 1.0))).unwrap()
    }

    fn translate(x: f64, y: f64, z: f64) -> LocalTransform {
        LocalTransform::new(DMat4::from_translation(DVec3::new(x, y, z))).unwrap()
    }

    #[test]
    fn box_corners_resorted_under_reflection() {
        let probe = BoxProbe(Aabb3D::new(DVec3::new(1.0, 0.0, 0.0), DVec3::new(3.0, 1.0, 1.0)));
        let local = probe.to_local(&reflect_x()).unwrap();
        assert_eq!(local.0.min, DVec3::new(-3.0, 0.0, 0.0));
        assert_eq!(local.0.max, DVec3::new(-1.0, 1.0, 1.0));
        assert!(local.0.min.cmple(local.0.max).all());
    }

    #[test]
    fn sphere_radius_follows_inverse_scale() {
        let scale = LocalTransform::new(DMat4::from_scale(DVec3::splat(4.0))).unwrap();
        let local = SphereProbe(BoundingSphere::new(DVec3::new(8.0, 0.0, 0.0), 2.0))
            .to_local(&scale)
            .unwrap();
        assert!((local.0.radius - 0.5).abs() < 1e-12);
        assert!((local.0.center - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn ray_parameter_is_invariant() {
        let bounds = BoundingVolume::Box(Aabb3D::new(DVec3::splat(-1.0), DVec3::splat(1.0)));
        let t = LocalTransform::new(
            DMat4::from_translation(DVec3::new(0.0, 0.0, -10.0))
                * DMat4::from_scale(DVec3::splat(3.0)),
        )
        .unwrap();
        let world = RayProbe::new(DVec3::ZERO, DVec3::NEG_Z).unwrap();
        let local = world.to_local(&t).unwrap();
        // Box spans z in [-13, -7] in world space.
        let entry = local.test_bounds(&bounds).unwrap();
        assert!((entry - 7.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_probes_are_rejected() {
        assert!(RayProbe::new(DVec3::ONE, DVec3::ZERO).is_none());
        assert!(Cylinder::from_endpoints(DVec3::ONE, DVec3::ONE, 1.0).is_none());
        assert!(Cone::new(DVec3::ZERO, DVec3::ZERO, 0.3).is_none());
    }

    #[test]
    fn cylinder_keeps_height_through_translation() {
        let cyl = CylinderProbe(
            Cylinder::from_endpoints(DVec3::ZERO, DVec3::new(0.0, 4.0, 0.0), 1.0).unwrap(),
        );
        let local = cyl.to_local(&translate(0.0, 2.0, 0.0)).unwrap();
        assert!((local.0.half_height - 2.0).abs() < 1e-12);
        assert!(local.0.center.length() < 1e-12);
    }

    /// Scale by 2, then a quarter turn about z, then shift +10 along x.
    fn turned_and_doubled() -> LocalTransform {
        LocalTransform::new(
            DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0))
                * DMat4::from_rotation_z(core::f64::consts::FRAC_PI_2)
                * DMat4::from_scale(DVec3::splat(2.0)),
        )
        .unwrap()
    }

    #[test]
    fn volume_shapes_rescale_under_rotation() {
        let t = turned_and_doubled();

        let sphere = SphereProbe(BoundingSphere::new(DVec3::new(10.0, 8.0, 0.0), 3.0));
        let local = sphere.to_local(&t).unwrap().0;
        assert!((local.radius - 1.5).abs() < 1e-12);
        assert!((local.center - DVec3::new(4.0, 0.0, 0.0)).length() < 1e-12);

        let cylinder = CylinderProbe(
            Cylinder::from_endpoints(DVec3::new(6.0, 8.0, 0.0), DVec3::new(14.0, 8.0, 0.0), 2.0)
                .unwrap(),
        );
        let local = cylinder.to_local(&t).unwrap().0;
        assert!((local.radius - 1.0).abs() < 1e-12);
        assert!((local.half_height - 2.0).abs() < 1e-12);
        assert!((local.center - DVec3::new(4.0, 0.0, 0.0)).length() < 1e-12);
        assert!((local.axis.dot(DVec3::Y).abs() - 1.0).abs() < 1e-12);

        let cone = ConeProbe(Cone::new(DVec3::new(10.0, 20.0, 0.0), DVec3::NEG_Y, 0.25).unwrap());
        let local = cone.to_local(&t).unwrap().0;
        assert!((local.vertex - DVec3::new(10.0, 0.0, 0.0)).length() < 1e-12);
        assert!((local.axis - DVec3::NEG_X).length() < 1e-12);
        assert!((local.axis.length() - 1.0).abs() < 1e-12);
        assert_eq!(local.half_angle, 0.25);
    }

    #[test]
    fn frustum_pushes_cumulative_down() {
        let f = FrustumProbe::new(Frustum::from_view_projection(&DMat4::orthographic_rh(
            -1.0, 1.0, -1.0, 1.0, 0.0, 10.0,
        )));
        let t = translate(0.0, 0.0, -5.0);
        let local = f.to_local(&t).unwrap();
        assert_eq!(local.level(&t), *t.forward());
        let unit = BoundingVolume::Box(Aabb3D::new(DVec3::splat(-0.5), DVec3::splat(0.5)));
        assert!(local.test_bounds(&unit).is_some());
        // Pushed twice as far back, the box leaves the far plane.
        let far = local.to_local(&translate(0.0, 0.0, -6.0)).unwrap();
        assert!(far.test_bounds(&unit).is_none());
    }
}
