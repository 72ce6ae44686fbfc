// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The traversal skeleton: one visitor per structural node kind, generic over
//! the probe strategy.

use glam::{DMat4, DVec3};
use understory_bounds3d::{Aabb3D, BoundingSphere, BoundingVolume, Cone, Cylinder, Frustum};

use crate::accumulate;
use crate::node::{LocalTransform, PickScene, PickableBounds, Proxy, Structure};
use crate::probe::Probe;
use crate::request::{PickRequest, PickResults};
use crate::state::TraversalState;
use crate::strategy::{
    BoxProbe, ConeProbe, CylinderProbe, FrustumProbe, LocalProbe, PointProbe, RayProbe,
    SegmentProbe, SphereProbe,
};
use crate::types::{HitPayload, PickMask, SortPolicy};
use crate::warning::{PickWarning, WarningReporter};

/// Traversal behavior derived from the sort policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Stop at the first hit.
    First,
    /// Keep the best-ranked hit.
    Closest,
    /// Record every hit in pre-order.
    All,
}

impl From<SortPolicy> for Mode {
    fn from(sort: SortPolicy) -> Self {
        match sort {
            SortPolicy::AnyOne => Self::First,
            SortPolicy::ClosestOne => Self::Closest,
            SortPolicy::AllOrdered | SortPolicy::AllUnordered => Self::All,
        }
    }
}

/// Run one request against `root`, returning the result count.
pub(crate) fn run<S, R>(
    scene: &S,
    root: S::Node,
    request: &mut PickRequest<S::Node>,
    state: &mut TraversalState<S::Node>,
    reporter: &R,
) -> usize
where
    S: PickScene + ?Sized,
    R: WarningReporter + ?Sized,
{
    request.results.clear();
    state.reset();
    if !scene.check_pick_mask(root, request.mask) {
        return 0;
    }
    let probe = request.probe;
    let mut walk = Walk {
        scene,
        state,
        reporter,
        results: &mut request.results,
        probe: &probe,
        anchor: probe.anchor(),
        mode: request.sort.into(),
        mask: request.mask,
        want_world_transform: request.want_world_transform,
        use_exact_geometry: request.use_exact_geometry,
        best: f64::INFINITY,
        done: false,
    };
    match probe {
        Probe::Point { position } => walk.visit(root, PointProbe(position)),
        Probe::Ray { origin, direction } => {
            if let Some(ray) = RayProbe::new(origin, direction) {
                walk.visit(root, ray);
            }
        }
        Probe::Segment { start, end } => walk.visit(root, SegmentProbe::new(start, end)),
        Probe::Box { min, max } => walk.visit(root, BoxProbe(Aabb3D::from_corners(min, max))),
        Probe::Sphere { center, radius } => {
            walk.visit(root, SphereProbe(BoundingSphere::new(center, radius)));
        }
        Probe::Cone {
            vertex,
            direction,
            half_angle,
        } => {
            if let Some(cone) = Cone::new(vertex, direction, half_angle) {
                walk.visit(root, ConeProbe(cone));
            }
        }
        Probe::Cylinder { start, end, radius } => {
            if let Some(cylinder) = Cylinder::from_endpoints(start, end, radius) {
                walk.visit(root, CylinderProbe(cylinder));
            }
        }
        Probe::Frustum { planes } => walk.visit(root, FrustumProbe::new(Frustum::new(planes))),
    }
    debug_assert_eq!(walk.state.depth(), 0, "traversal left levels on the stack");
    request.results.len()
}

/// Carry `probe` through an optional local transform, yielding the child-space
/// probe and the stack level to push.
fn enter<P: LocalProbe>(
    probe: P,
    transform: Option<&LocalTransform>,
) -> Option<(P, DMat4, bool)> {
    match transform {
        Some(t) => {
            let local = probe.to_local(t)?;
            Some((local, local.level(t), true))
        }
        None => Some((probe, DMat4::IDENTITY, false)),
    }
}

struct Walk<'a, S: PickScene + ?Sized, R: ?Sized> {
    scene: &'a S,
    state: &'a mut TraversalState<S::Node>,
    reporter: &'a R,
    results: &'a mut PickResults<S::Node>,
    probe: &'a Probe,
    anchor: Option<DVec3>,
    mode: Mode,
    mask: PickMask,
    want_world_transform: bool,
    use_exact_geometry: bool,
    best: f64,
    done: bool,
}

impl<S, R> Walk<'_, S, R>
where
    S: PickScene + ?Sized,
    R: WarningReporter + ?Sized,
{
    fn visit<P: LocalProbe>(&mut self, node: S::Node, probe: P) {
        if self.done {
            return;
        }
        let scene = self.scene;
        match scene.structure(node) {
            Structure::Leaf => self.visit_leaf(node, probe),
            Structure::Group { children } => self.visit_group(node, probe, children, None),
            Structure::TransformGroup {
                children,
                transform,
            } => self.visit_group(node, probe, children, Some(transform)),
            Structure::PassThrough { child } => self.visit_pass_through(node, probe, child),
            Structure::Custom => self.visit_custom(node, probe),
        }
    }

    /// Mask and bounds test shared by groups and leaves.
    fn admit<P: LocalProbe>(
        &self,
        node: S::Node,
        probe: &P,
    ) -> Option<(PickableBounds<S::Node>, f64)> {
        if !self.scene.check_pick_mask(node, self.mask) {
            return None;
        }
        let bounds = self.scene.pickable_bounds(node)?;
        let entry = probe.test_bounds(&bounds.volume)?;
        // Nothing under this entry point can beat the current best.
        if P::PARAMETRIC && self.mode == Mode::Closest && entry >= self.best {
            return None;
        }
        Some((bounds, entry))
    }

    fn visit_proxy<P: LocalProbe>(&mut self, node: S::Node, probe: P, proxy: Proxy<S::Node>) {
        match proxy {
            Proxy::Node(target) => {
                let depth = self.state.push(node, DMat4::IDENTITY, false);
                if !self.revisits(target, "proxy") {
                    self.visit(target, probe);
                }
                self.state.pop(depth);
            }
            Proxy::Missing => {}
            Proxy::Unsupported { type_name } => {
                self.reporter
                    .warning(&PickWarning::UnsupportedProxy { type_name });
            }
        }
    }

    /// Whether `node` is already on the current path. Following it again would
    /// never terminate, so the edge is reported and treated as a miss.
    fn revisits(&self, node: S::Node, edge: &'static str) -> bool {
        let cyclic = self.state.path().contains(&node);
        if cyclic {
            self.reporter.warning(&PickWarning::Cycle { edge });
        }
        cyclic
    }

    fn visit_children<P: LocalProbe>(&mut self, children: &[Option<S::Node>], probe: P) {
        for child in children.iter().flatten() {
            if self.done {
                break;
            }
            self.visit(*child, probe);
        }
    }

    fn visit_group<P: LocalProbe>(
        &mut self,
        node: S::Node,
        probe: P,
        children: &[Option<S::Node>],
        transform: Option<&LocalTransform>,
    ) {
        let Some((bounds, _)) = self.admit(node, &probe) else {
            return;
        };
        if let Some(proxy) = bounds.proxy {
            self.visit_proxy(node, probe, proxy);
            return;
        }
        let Some((local, level, valid)) = enter(probe, transform) else {
            return;
        };
        let depth = self.state.push(node, level, valid);
        self.visit_children(children, local);
        self.state.pop(depth);
    }

    fn visit_pass_through<P: LocalProbe>(
        &mut self,
        node: S::Node,
        probe: P,
        child: Option<S::Node>,
    ) {
        let Some(child) = child else {
            return;
        };
        let depth = self.state.push(node, DMat4::IDENTITY, false);
        if !self.revisits(child, "pass-through child") {
            self.visit(child, probe);
        }
        self.state.pop(depth);
    }

    fn visit_custom<P: LocalProbe>(&mut self, node: S::Node, probe: P) {
        let scene = self.scene;
        if !scene.check_pick_mask(node, self.mask) {
            return;
        }
        let world = accumulate::world(self.state, P::CUMULATIVE);
        let slot = self.state.depth();
        let mut children = self.state.take_child_buffer(slot);
        let transform = scene.produce_children(node, self.probe, &world, &mut children);
        if children.iter().any(Option::is_some) {
            if let Some((local, level, valid)) = enter(probe, transform.as_ref()) {
                let depth = self.state.push(node, level, valid);
                for child in children.iter().flatten() {
                    if self.done {
                        break;
                    }
                    if !self.revisits(*child, "custom child") {
                        self.visit(*child, local);
                    }
                }
                self.state.pop(depth);
            }
        }
        self.state.put_child_buffer(slot, children);
    }

    fn visit_leaf<P: LocalProbe>(&mut self, node: S::Node, probe: P) {
        let Some((bounds, entry)) = self.admit(node, &probe) else {
            return;
        };
        if let Some(proxy) = bounds.proxy {
            self.visit_proxy(node, probe, proxy);
            return;
        }
        let mut payload = None;
        if self.use_exact_geometry {
            if let Some(query) = probe.exact() {
                let closest = self.mode == Mode::Closest;
                match self.scene.exact_intersect(node, &query, closest) {
                    Some(p) => payload = Some(p),
                    None => return,
                }
            }
        }
        let depth = self.state.push(node, DMat4::IDENTITY, false);
        self.record::<P>(entry, payload, &bounds.volume);
        self.state.pop(depth);
    }

    /// Stamp the current path as a hit, according to the mode.
    fn record<P: LocalProbe>(
        &mut self,
        entry: f64,
        payload: Option<HitPayload>,
        volume: &BoundingVolume,
    ) {
        let by_distance = !P::PARAMETRIC && self.anchor.is_some();
        let (world, inverse) = if self.want_world_transform {
            accumulate::world_and_inverse(self.state, P::CUMULATIVE)
        } else if by_distance {
            (accumulate::world(self.state, P::CUMULATIVE), DMat4::IDENTITY)
        } else {
            (DMat4::IDENTITY, DMat4::IDENTITY)
        };
        let rank = if P::PARAMETRIC {
            payload.map_or(entry, |p| p.parameter)
        } else {
            match (self.anchor, volume.center()) {
                (Some(anchor), Some(center)) => world.transform_point3(center).distance(anchor),
                _ => 0.0,
            }
        };
        let index = match self.mode {
            Mode::First => {
                self.done = true;
                0
            }
            Mode::Closest => {
                if !self.results.is_empty() && rank >= self.best {
                    return;
                }
                self.best = rank;
                // Ranks are never negative and ties keep the earlier hit.
                self.done = rank <= 0.0;
                0
            }
            Mode::All => self.results.len(),
        };
        let world = if self.want_world_transform {
            world
        } else {
            DMat4::IDENTITY
        };
        self.results
            .record(index, self.state.path(), world, inverse, payload, rank);
    }
}
