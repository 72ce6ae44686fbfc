// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Custom nodes.
//!
//! A level-of-detail node that offers its detailed mesh to nearby probes and a
//! coarse box to distant ones, plus a raw probe with a bad kind code that is
//! reported and skipped.
//!
//! Run:
//! - `RUST_LOG=warn cargo run -p understory_examples --example pick_custom`

use glam::{DMat4, DVec3};
use understory_bounds3d::{Aabb3D, BoundingVolume};
use understory_pick::{LocalTransform, PickRequest, Picker, Probe, RawProbe, SortPolicy};
use understory_scene3d::{Content, NodeId, Scene, TriangleMesh};

fn main() {
    env_logger::init();

    let mut scene = Scene::new();
    let detail = scene
        .insert(None, Content::Leaf(TriangleMesh::cuboid(DVec3::ONE).into()))
        .unwrap();
    let coarse = scene
        .insert(
            None,
            Content::Leaf(
                BoundingVolume::Box(Aabb3D::from_center_half_extents(DVec3::ZERO, DVec3::ONE))
                    .into(),
            ),
        )
        .unwrap();
    let root = scene.insert(None, Content::Group).unwrap();
    let placed = scene
        .insert(
            Some(root),
            Content::transform(DMat4::from_translation(DVec3::new(0.0, 0.0, -30.0))).unwrap(),
        )
        .unwrap();
    scene
        .insert(
            Some(placed),
            Content::custom(
                move |probe: &Probe,
                      world: &DMat4,
                      children: &mut Vec<Option<NodeId>>|
                      -> Option<LocalTransform> {
                    let center = world.transform_point3(DVec3::ZERO);
                    let close = probe.anchor().is_some_and(|a| a.distance(center) < 50.0);
                    log::debug!("lod: {}", if close { "detail" } else { "coarse" });
                    children.push(Some(if close { detail } else { coarse }));
                    None
                },
            ),
        )
        .unwrap();
    scene.commit();

    let mut picker = Picker::new();
    for z in [0.0, 100.0] {
        let mut request = PickRequest::new(
            Probe::Ray {
                origin: DVec3::new(0.0, 0.0, z),
                direction: DVec3::NEG_Z,
            },
            SortPolicy::ClosestOne,
        );
        picker.pick(&scene, root, &mut request);
        let leaf = request.results.first().and_then(|h| h.leaf());
        println!("ray from z = {z}: {}", if leaf == Some(detail) { "detail" } else { "coarse" });
    }

    let raw = RawProbe {
        kind: 200,
        ..RawProbe::default()
    };
    let mut request = PickRequest::new(Probe::Point { position: DVec3::ZERO }, SortPolicy::AnyOne);
    let n = picker.pick_raw(&scene, root, &raw, &mut request);
    println!("raw probe with kind 200: {n} hit(s)");
}
