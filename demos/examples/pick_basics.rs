// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Picking basics.
//!
//! Build a small scene with a shared mesh instanced twice, then cast a ray with
//! each sort policy and print the hit paths.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_examples --example pick_basics`

use glam::{DMat4, DVec3};
use understory_pick::{PickRequest, Picker, Probe, SortPolicy};
use understory_scene3d::{Content, Scene, TriangleMesh};

fn main() {
    env_logger::init();

    let mut scene = Scene::new();
    let crate_mesh = scene
        .insert(None, Content::Leaf(TriangleMesh::cuboid(DVec3::splat(0.5)).into()))
        .unwrap();
    let root = scene.insert(None, Content::Group).unwrap();
    let mut instances = Vec::new();
    for z in [-10.0, -4.0] {
        let placed = scene
            .insert(
                Some(root),
                Content::transform(DMat4::from_translation(DVec3::new(0.0, 0.0, z))).unwrap(),
            )
            .unwrap();
        instances.push(scene.insert(Some(placed), Content::Link(Some(crate_mesh))).unwrap());
    }
    let changed = scene.commit();
    println!("committed: {changed} node bounds changed");

    let mut picker = Picker::new();
    let ray = Probe::Ray {
        origin: DVec3::new(0.2, 0.1, 0.0),
        direction: DVec3::NEG_Z,
    };
    for sort in [
        SortPolicy::ClosestOne,
        SortPolicy::AnyOne,
        SortPolicy::AllOrdered,
    ] {
        let mut request = PickRequest::new(ray, sort)
            .with_exact_geometry(true)
            .with_world_transform(true);
        let n = picker.pick(&scene, root, &mut request);
        println!("{sort:?}: {n} hit(s)");
        for hit in &request.results {
            println!(
                "  path {:?} at t = {:.2}, world point {:?}",
                hit.nodes,
                hit.rank,
                hit.world_point()
            );
        }
    }

    // Closest must be the nearer instance, regardless of declaration order.
    let mut request = PickRequest::new(ray, SortPolicy::ClosestOne).with_exact_geometry(true);
    picker.pick(&scene, root, &mut request);
    assert_eq!(request.results.hits()[0].nodes[2], instances[1]);
}
