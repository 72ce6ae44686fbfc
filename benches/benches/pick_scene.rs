// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::{DMat4, DVec3};
use understory_pick::{PickRequest, Picker, Probe, SortPolicy};
use understory_scene3d::{Content, NodeId, Scene, TriangleMesh};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// `n * n` instances of one cube on the `z = 0` plane, spaced 4 units apart,
/// each under its own transform group and link.
fn instanced_grid(n: usize) -> (Scene, NodeId) {
    let mut scene = Scene::new();
    let cube = scene
        .insert(None, Content::Leaf(TriangleMesh::cuboid(DVec3::ONE).into()))
        .unwrap();
    let root = scene.insert(None, Content::Group).unwrap();
    for y in 0..n {
        let row = scene.insert(Some(root), Content::Group).unwrap();
        for x in 0..n {
            let at = DVec3::new(x as f64 * 4.0, y as f64 * 4.0, 0.0);
            let t = scene
                .insert(Some(row), Content::transform(DMat4::from_translation(at)).unwrap())
                .unwrap();
            scene.insert(Some(t), Content::Link(Some(cube))).unwrap();
        }
    }
    scene.commit();
    (scene, root)
}

/// Rays looking down `-z` onto random points of the grid.
fn gen_rays(n: usize, count: usize, seed: u64) -> Vec<Probe> {
    let mut rng = Rng::new(seed);
    let extent = n as f64 * 4.0;
    (0..count)
        .map(|_| Probe::Ray {
            origin: DVec3::new(rng.next_f64() * extent, rng.next_f64() * extent, 10.0),
            direction: DVec3::NEG_Z,
        })
        .collect()
}

fn bench_rays(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick_ray");
    for &n in &[16_usize, 64] {
        let (scene, root) = instanced_grid(n);
        let rays = gen_rays(n, 256, 0x9e37_79b9_7f4a_7c15);
        group.throughput(Throughput::Elements(rays.len() as u64));
        for (label, sort, exact) in [
            ("closest_bounds", SortPolicy::ClosestOne, false),
            ("closest_exact", SortPolicy::ClosestOne, true),
            ("any", SortPolicy::AnyOne, false),
            ("all_ordered", SortPolicy::AllOrdered, false),
        ] {
            let mut requests: Vec<_> = rays
                .iter()
                .map(|p| PickRequest::new(*p, sort).with_exact_geometry(exact))
                .collect();
            let mut picker = Picker::new();
            group.bench_function(format!("{label}/{n}x{n}"), |b| {
                b.iter(|| black_box(picker.pick_batch(&scene, root, &mut requests)));
            });
        }
    }
    group.finish();
}

fn bench_frustum(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick_frustum");
    for &n in &[16_usize, 64] {
        let (scene, root) = instanced_grid(n);
        let extent = n as f64 * 4.0;
        let eye = DVec3::new(extent * 0.5, extent * 0.5, extent);
        let view = DMat4::look_at_rh(eye, DVec3::new(extent * 0.5, extent * 0.5, 0.0), DVec3::Y);
        let projection = DMat4::perspective_rh(0.6, 1.0, 0.1, extent * 4.0);
        let probe = Probe::frustum_from_view_projection(&(projection * view));
        let mut picker = Picker::new();
        group.bench_function(format!("all_unordered/{n}x{n}"), |b| {
            b.iter_batched(
                || PickRequest::new(probe, SortPolicy::AllUnordered).with_world_transform(true),
                |mut request| black_box(picker.pick(&scene, root, &mut request)),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");
    for &n in &[16_usize, 64] {
        group.bench_function(format!("move_one/{n}x{n}"), |b| {
            b.iter_batched(
                || {
                    let (mut scene, root) = instanced_grid(n);
                    let row = scene.children(root).unwrap()[0].unwrap();
                    let t = scene.children(row).unwrap()[0].unwrap();
                    scene
                        .set_transform(t, DMat4::from_translation(DVec3::new(-4.0, 0.0, 0.0)))
                        .unwrap();
                    scene
                },
                |mut scene| black_box(scene.commit()),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

#[cfg(feature = "rayon")]
fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick_ray_parallel");
    let n = 64;
    let (scene, root) = instanced_grid(n);
    let rays = gen_rays(n, 4096, 0x2545_f491_4f6c_dd1d);
    group.throughput(Throughput::Elements(rays.len() as u64));
    let mut requests: Vec<_> = rays
        .iter()
        .map(|p| PickRequest::new(*p, SortPolicy::ClosestOne).with_exact_geometry(true))
        .collect();
    let picker = Picker::new();
    group.bench_function("closest_exact/64x64", |b| {
        b.iter(|| black_box(picker.pick_batch_parallel(&scene, root, &mut requests)));
    });
    group.finish();
}

#[cfg(not(feature = "rayon"))]
fn bench_parallel(_c: &mut Criterion) {}

criterion_group!(benches, bench_rays, bench_frustum, bench_commit, bench_parallel);
criterion_main!(benches);
