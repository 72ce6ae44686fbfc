// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_bounds3d --heading-base-level=0

//! Understory Bounds 3D: bounding volumes and probe predicates.
//!
//! Understory Bounds 3D is the geometric layer underneath picking.
//!
//! - [`Aabb3D`] and [`BoundingSphere`] describe pickable bounds; [`BoundingVolume`] wraps them
//!   together with the `Empty` and `Infinite` sentinels.
//! - [`Cone`], [`Cylinder`] and [`Frustum`] describe probe shapes that have no
//!   bounding-volume form.
//! - Every predicate is conservative: a `true` may be a near miss, a `false` is always a miss.
//! - [`line_triangle`] and friends provide exact ray/segment tests for triangle geometry.
//!
//! It uses `glam`'s double-precision types throughout and knows nothing about scene graphs.
//! Higher layers (the picking core, a scene) decide which volume belongs to which node and
//! in which coordinate space.
//!
//! ## Parametric distances
//!
//! Ray and segment predicates return an entry *parameter* rather than a length:
//! the hit point is `origin + t * direction` (or `start + t * (end - start)`).
//! Because affine maps preserve ratios along a line, the same parameter is valid
//! in every coordinate space the line is carried through.
//!
//! # Example
//!
//! ```rust
//! use glam::{DMat4, DVec3};
//! use understory_bounds3d::{Aabb3D, BoundingVolume, Frustum};
//!
//! let bounds = BoundingVolume::Box(Aabb3D::new(DVec3::splat(-1.0), DVec3::splat(1.0)));
//!
//! // A ray from x = -5 travelling +x enters the box at t = 4.
//! let t = bounds.ray_entry(DVec3::new(-5.0, 0.0, 0.0), DVec3::X).unwrap();
//! assert!((t - 4.0).abs() < 1e-12);
//!
//! // Frusta classify object-space volumes given the object-to-world matrix.
//! let proj = DMat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
//! let view = DMat4::look_at_rh(DVec3::new(0.0, 0.0, 10.0), DVec3::ZERO, DVec3::Y);
//! let frustum = Frustum::from_view_projection(&(proj * view));
//! assert!(frustum.intersects_volume(&bounds, &DMat4::IDENTITY));
//! let pushed_back = DMat4::from_translation(DVec3::new(0.0, 0.0, 50.0));
//! assert!(!frustum.intersects_volume(&bounds, &pushed_back));
//! ```

pub mod frustum;
pub mod shapes;
pub mod triangle;
pub mod types;
pub mod util;
pub mod volume;

pub use frustum::Frustum;
pub use shapes::{Cone, Cylinder};
pub use triangle::{TriangleHit, line_triangle, ray_triangle, segment_triangle};
pub use types::{Aabb3D, BoundingSphere};
pub use util::{is_invertible, uniform_scale};
pub use volume::BoundingVolume;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DMat4, DVec3};

    #[test]
    fn volumes_agree_after_transform() {
        let m = DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0))
            * DMat4::from_scale(DVec3::splat(2.0));
        let local = BoundingVolume::Box(Aabb3D::new(DVec3::splat(-1.0), DVec3::splat(1.0)));
        let world = local.transformed(&m);
        assert!(world.contains_point(DVec3::new(11.5, 1.5, -1.5)));
        assert!(!world.contains_point(DVec3::new(7.5, 0.0, 0.0)));

        // The parameter along a segment survives the mapping.
        let (a, b) = (DVec3::new(-5.0, 0.0, 0.0), DVec3::new(5.0, 0.0, 0.0));
        let t_world = world
            .segment_entry(m.transform_point3(a), m.transform_point3(b))
            .unwrap();
        let t_local = local.segment_entry(a, b).unwrap();
        assert!((t_world - t_local).abs() < 1e-12);
    }
}
