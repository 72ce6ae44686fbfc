// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A minimal vector-backed scene for unit tests.

use std::sync::Mutex;

use glam::DMat4;
use understory_bounds3d::{Aabb3D, BoundingVolume};

use crate::node::{LocalTransform, PickScene, PickableBounds, Proxy, Structure};
use crate::probe::Probe;
use crate::types::{ExactQuery, HitPayload, PickMask};

type Producer =
    Box<dyn Fn(&Probe, &DMat4, &mut Vec<Option<usize>>) -> Option<LocalTransform> + Send + Sync>;

enum Kind {
    Leaf { core: Option<Aabb3D> },
    Group(Vec<Option<usize>>),
    Transform(Vec<Option<usize>>, LocalTransform),
    PassThrough(Option<usize>),
    Custom(Producer),
}

struct Node {
    kind: Kind,
    volume: BoundingVolume,
    proxy: Option<Proxy<usize>>,
    mask: PickMask,
}

#[derive(Default)]
pub(crate) struct TestScene {
    nodes: Vec<Node>,
    bounds_queries: Mutex<Vec<usize>>,
}

impl TestScene {
    fn add(&mut self, kind: Kind, volume: BoundingVolume) -> usize {
        self.nodes.push(Node {
            kind,
            volume,
            proxy: None,
            mask: PickMask::all(),
        });
        self.nodes.len() - 1
    }

    fn enclosing(&self, children: &[Option<usize>]) -> BoundingVolume {
        children
            .iter()
            .flatten()
            .fold(BoundingVolume::Empty, |acc, &c| acc.union(&self.nodes[c].volume))
    }

    pub(crate) fn leaf(&mut self, bounds: Aabb3D) -> usize {
        self.add(Kind::Leaf { core: None }, bounds.into())
    }

    pub(crate) fn leaf_with_core(&mut self, bounds: Aabb3D, core: Aabb3D) -> usize {
        self.add(Kind::Leaf { core: Some(core) }, bounds.into())
    }

    pub(crate) fn group(&mut self, children: &[Option<usize>]) -> usize {
        let volume = self.enclosing(children);
        self.add(Kind::Group(children.to_vec()), volume)
    }

    pub(crate) fn transform_group(
        &mut self,
        transform: LocalTransform,
        children: &[Option<usize>],
    ) -> usize {
        let volume = self.enclosing(children).transformed(transform.forward());
        self.add(Kind::Transform(children.to_vec(), transform), volume)
    }

    /// Pass-through nodes report the child's extent so enclosing groups see it.
    pub(crate) fn pass_through(&mut self, child: Option<usize>) -> usize {
        let volume = child.map_or(BoundingVolume::Empty, |c| self.nodes[c].volume);
        self.add(Kind::PassThrough(child), volume)
    }

    pub(crate) fn custom(
        &mut self,
        producer: impl Fn(&Probe, &DMat4, &mut Vec<Option<usize>>) -> Option<LocalTransform>
        + Send
        + Sync
        + 'static,
    ) -> usize {
        self.add(Kind::Custom(Box::new(producer)), BoundingVolume::Infinite)
    }

    pub(crate) fn relink(&mut self, node: usize, child: Option<usize>) {
        self.nodes[node].kind = Kind::PassThrough(child);
    }

    pub(crate) fn set_mask(&mut self, node: usize, mask: PickMask) {
        self.nodes[node].mask = mask;
    }

    pub(crate) fn set_proxy(&mut self, node: usize, proxy: Proxy<usize>) {
        self.nodes[node].proxy = Some(proxy);
    }

    fn queries(&self) -> std::sync::MutexGuard<'_, Vec<usize>> {
        self.bounds_queries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub(crate) fn bounds_queries(&self) -> usize {
        self.queries().len()
    }

    pub(crate) fn bounds_queries_of(&self, node: usize) -> usize {
        self.queries()
            .iter()
            .filter(|&&n| n == node)
            .count()
    }
}

impl PickScene for TestScene {
    type Node = usize;

    fn pickable_bounds(&self, node: usize) -> Option<PickableBounds<usize>> {
        self.queries().push(node);
        let n = &self.nodes[node];
        Some(PickableBounds {
            volume: n.volume,
            proxy: n.proxy,
        })
    }

    fn check_pick_mask(&self, node: usize, mask: PickMask) -> bool {
        self.nodes[node].mask.intersects(mask)
    }

    fn structure(&self, node: usize) -> Structure<'_, usize> {
        match &self.nodes[node].kind {
            Kind::Leaf { .. } => Structure::Leaf,
            Kind::Group(children) => Structure::Group { children },
            Kind::Transform(children, transform) => Structure::TransformGroup {
                children,
                transform,
            },
            Kind::PassThrough(child) => Structure::PassThrough { child: *child },
            Kind::Custom(_) => Structure::Custom,
        }
    }

    fn produce_children(
        &self,
        node: usize,
        probe: &Probe,
        world: &DMat4,
        children: &mut Vec<Option<usize>>,
    ) -> Option<LocalTransform> {
        match &self.nodes[node].kind {
            Kind::Custom(producer) => producer(probe, world, children),
            _ => None,
        }
    }

    fn exact_intersect(
        &self,
        node: usize,
        query: &ExactQuery,
        _want_closest: bool,
    ) -> Option<HitPayload> {
        let Kind::Leaf { core: Some(core) } = self.nodes[node].kind else {
            return None;
        };
        let core = BoundingVolume::Box(core);
        let (o, d, _) = query.line();
        let t = match *query {
            ExactQuery::Ray { origin, direction } => core.ray_entry(origin, direction),
            ExactQuery::Segment { start, end } => core.segment_entry(start, end),
        }?;
        Some(HitPayload::at(t, o + d * t))
    }
}
