// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frustum picking.
//!
//! Lay out a ring of boxes, then collect everything inside a camera's view
//! volume. The frustum is given once in world space and never transformed.
//!
//! Run:
//! - `cargo run -p understory_examples --example pick_frustum`

use std::f64::consts::TAU;

use glam::{DMat4, DVec3};
use understory_bounds3d::{Aabb3D, BoundingVolume};
use understory_pick::{PickRequest, Picker, Probe, SortPolicy};
use understory_scene3d::{Content, Geometry, Scene};

fn main() {
    env_logger::init();

    let mut scene = Scene::new();
    let root = scene.insert(None, Content::Group).unwrap();
    let count = 12;
    for i in 0..count {
        let angle = TAU * f64::from(i) / f64::from(count);
        let spoke = scene
            .insert(
                Some(root),
                Content::transform(
                    DMat4::from_rotation_y(angle)
                        * DMat4::from_translation(DVec3::new(0.0, 0.0, -20.0)),
                )
                .unwrap(),
            )
            .unwrap();
        scene
            .insert(
                Some(spoke),
                Content::Leaf(Geometry::Volume(BoundingVolume::Box(Aabb3D::from_center_half_extents(
                    DVec3::ZERO,
                    DVec3::ONE,
                )))),
            )
            .unwrap();
    }
    scene.commit();

    // Camera at the origin looking down -z with a 60 degree field of view.
    let projection = DMat4::perspective_rh(60_f64.to_radians(), 16.0 / 9.0, 0.1, 100.0);
    let mut request = PickRequest::new(
        Probe::frustum_from_view_projection(&projection),
        SortPolicy::AllUnordered,
    )
    .with_world_transform(true);

    let mut picker = Picker::new();
    let visible = picker.pick(&scene, root, &mut request);
    println!("{visible} of {count} boxes in view");
    for hit in &request.results {
        let center = hit.world.transform_point3(DVec3::ZERO);
        println!("  {:?} centered at {center}", hit.leaf());
    }
}
