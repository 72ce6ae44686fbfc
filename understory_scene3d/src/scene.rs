// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: structure, updates, and the picking facade.

use glam::DMat4;
use understory_bounds3d::BoundingVolume;
use understory_pick::{
    ExactQuery, HitPayload, LocalTransform, PickMask, PickScene, PickableBounds, Probe, Proxy,
    Structure,
};

use crate::types::{Content, NodeId, ProxyTarget, SceneError};

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// A retained 3D scene graph.
///
/// Nodes live in a generational arena. Groups own their children; links
/// reference nodes without owning them, so a subgraph can be instanced under
/// several parents.
///
/// Pickable bounds are cached per node in the parent's space and refreshed by
/// [`Scene::commit`]; edits made after the last commit are not visible to picking
/// bounds until the next one.
pub struct Scene {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    epoch: u64,
    dirty: bool,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Scene")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("epoch", &self.epoch)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<Option<NodeId>>,
    content: Content,
    mask: PickMask,
    proxy: Option<ProxyTarget>,
    explicit_bounds: Option<BoundingVolume>,
    bounds: BoundingVolume,
    stamp: u64,
    in_progress: bool,
}

impl Node {
    fn new(generation: u32, content: Content) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            content,
            mask: PickMask::default(),
            proxy: None,
            explicit_bounds: None,
            bounds: BoundingVolume::Empty,
            stamp: 0,
            in_progress: false,
        }
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            epoch: 0,
            dirty: false,
        }
    }

    /// Insert a node, appended to `parent`'s children (or unparented if `None`).
    ///
    /// A link whose target reaches `parent` is rejected with [`SceneError::Cycle`].
    pub fn insert(
        &mut self,
        parent: Option<NodeId>,
        content: Content,
    ) -> Result<NodeId, SceneError> {
        if let Some(p) = parent {
            self.check_group(p)?;
            if let Content::Link(Some(target)) = &content {
                if self.reaches(*target, p) {
                    return Err(SceneError::Cycle(*target));
                }
            }
        }
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, content));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, content)));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let id = NodeId::new(idx as u32, generation);
        if let Some(p) = parent {
            self.link_parent(id, p);
        }
        self.dirty = true;
        Ok(id)
    }

    /// Remove a node and the children it owns.
    ///
    /// The parent keeps an empty slot where the node was until the next
    /// [`Scene::commit`]. Links to removed nodes become empty.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        self.unlink_parent(id);
        let children = self.node_opt(id).map(|n| n.children.clone()).unwrap_or_default();
        for child in children.into_iter().flatten() {
            self.remove(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
        self.dirty = true;
    }

    /// Move `id` under `new_parent` (or make it unparented).
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), SceneError> {
        if !self.is_alive(id) {
            return Err(SceneError::Stale(id));
        }
        if let Some(p) = new_parent {
            self.check_group(p)?;
            if self.reaches(id, p) {
                return Err(SceneError::Cycle(id));
            }
        }
        self.unlink_parent(id);
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
        self.dirty = true;
        Ok(())
    }

    /// Replace a transform group's local transform.
    pub fn set_transform(&mut self, id: NodeId, forward: DMat4) -> Result<(), SceneError> {
        let node = self.node_opt_mut(id).ok_or(SceneError::Stale(id))?;
        let Content::Transform(t) = &mut node.content else {
            return Err(SceneError::NotATransform(id));
        };
        *t = LocalTransform::new(forward).ok_or(SceneError::SingularTransform)?;
        self.dirty = true;
        Ok(())
    }

    /// Point a link at another node, or clear it.
    pub fn set_link(&mut self, id: NodeId, target: Option<NodeId>) -> Result<(), SceneError> {
        let node = self.node_opt(id).ok_or(SceneError::Stale(id))?;
        if !matches!(node.content, Content::Link(_)) {
            return Err(SceneError::NotALink(id));
        }
        if target.is_some_and(|t| self.reaches(t, id)) {
            return Err(SceneError::Cycle(id));
        }
        if let Some(Node {
            content: Content::Link(t),
            ..
        }) = self.node_opt_mut(id)
        {
            *t = target;
            self.dirty = true;
        }
        Ok(())
    }

    /// Update the node's pick mask.
    pub fn set_pick_mask(&mut self, id: NodeId, mask: PickMask) {
        if let Some(n) = self.node_opt_mut(id) {
            n.mask = mask;
        }
    }

    /// Set or clear proxy geometry.
    ///
    /// A proxy node that reaches `id`, including `id` itself, is rejected.
    pub fn set_proxy(&mut self, id: NodeId, proxy: Option<ProxyTarget>) -> Result<(), SceneError> {
        if !self.is_alive(id) {
            return Err(SceneError::Stale(id));
        }
        if let Some(ProxyTarget::Node(t)) = proxy {
            if self.reaches(t, id) {
                return Err(SceneError::Cycle(id));
            }
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.proxy = proxy;
        }
        Ok(())
    }

    /// Override the computed pickable bounds (parent space), or restore them with `None`.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Option<BoundingVolume>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.explicit_bounds = bounds;
            self.dirty = true;
        }
    }

    /// Recompute pickable bounds bottom-up. Returns the number of nodes whose bounds changed.
    ///
    /// Empty child slots left by removals are dropped first. Shared subgraphs are
    /// computed once.
    pub fn commit(&mut self) -> usize {
        if !self.dirty {
            return 0;
        }
        for node in self.nodes.iter_mut().flatten() {
            node.children.retain(Option::is_some);
        }
        self.epoch += 1;
        let mut changed = 0;
        for idx in 0..self.nodes.len() {
            let Some(generation) = self.nodes[idx].as_ref().map(|n| n.generation) else {
                continue;
            };
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            let id = NodeId::new(idx as u32, generation);
            self.update_bounds(id, &mut changed);
        }
        self.dirty = false;
        log::debug!(
            target: "understory_scene3d",
            "commit epoch {}: bounds changed on {changed} of {} nodes",
            self.epoch,
            self.len()
        );
        changed
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some()
    }

    /// Parent of a live node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id)?.parent
    }

    /// Child slots of a live node.
    pub fn children(&self, id: NodeId) -> Option<&[Option<NodeId>]> {
        self.node_opt(id).map(|n| n.children.as_slice())
    }

    /// Content of a live node.
    pub fn content(&self, id: NodeId) -> Option<&Content> {
        self.node_opt(id).map(|n| &n.content)
    }

    /// Committed pickable bounds, in the parent's space.
    pub fn bounds(&self, id: NodeId) -> Option<BoundingVolume> {
        self.node_opt(id).map(|n| n.bounds)
    }

    /// Local-to-world matrix following parent links (not pass-through links).
    pub fn world_transform(&self, id: NodeId) -> Option<DMat4> {
        let mut node = self.node_opt(id)?;
        let mut world = DMat4::IDENTITY;
        loop {
            if let Content::Transform(t) = &node.content {
                world = *t.forward() * world;
            }
            match node.parent.and_then(|p| self.node_opt(p)) {
                Some(parent) => node = parent,
                None => return Some(world),
            }
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Whether the scene has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- internals ---

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn check_group(&self, id: NodeId) -> Result<(), SceneError> {
        match self.node_opt(id) {
            None => Err(SceneError::Stale(id)),
            Some(n) if !n.content.is_group() => Err(SceneError::NotAGroup(id)),
            Some(_) => Ok(()),
        }
    }

    /// Whether `to` can be reached from `from` along child slots, link targets
    /// and node proxies. A node reaches itself.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            let Some(node) = self.node_opt(id) else {
                continue;
            };
            if core::mem::replace(&mut seen[id.idx()], true) {
                continue;
            }
            stack.extend(node.children.iter().flatten().copied());
            if let Content::Link(Some(target)) = &node.content {
                stack.push(*target);
            }
            if let Some(ProxyTarget::Node(target)) = node.proxy {
                stack.push(target);
            }
        }
        false
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_opt_mut(parent) {
            p.children.push(Some(id));
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.parent = Some(parent);
        }
    }

    fn unlink_parent(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(p) = self.node_opt_mut(parent) {
            for slot in &mut p.children {
                if *slot == Some(id) {
                    *slot = None;
                }
            }
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.parent = None;
        }
    }

    fn update_bounds(&mut self, id: NodeId, changed: &mut usize) -> BoundingVolume {
        let epoch = self.epoch;
        let Some(node) = self.node_opt_mut(id) else {
            return BoundingVolume::Empty;
        };
        if node.stamp == epoch {
            return if node.in_progress {
                BoundingVolume::Empty
            } else {
                node.bounds
            };
        }
        node.stamp = epoch;
        node.in_progress = true;
        let dependencies: Vec<NodeId> = match &node.content {
            Content::Link(target) => target.iter().copied().collect(),
            Content::Group | Content::Transform(_) => {
                node.children.iter().flatten().copied().collect()
            }
            Content::Leaf(_) | Content::Custom(_) => Vec::new(),
        };

        let enclosed = dependencies
            .into_iter()
            .fold(BoundingVolume::Empty, |acc, dep| {
                acc.union(&self.update_bounds(dep, changed))
            });

        let Some(node) = self.node_opt_mut(id) else {
            return BoundingVolume::Empty;
        };
        let computed = match &node.content {
            Content::Leaf(geometry) => geometry.bounds(),
            Content::Group | Content::Link(_) => enclosed,
            Content::Transform(t) => enclosed.transformed(t.forward()),
            Content::Custom(_) => BoundingVolume::Infinite,
        };
        let bounds = node.explicit_bounds.unwrap_or(computed);
        if bounds != node.bounds {
            *changed += 1;
        }
        node.bounds = bounds;
        node.in_progress = false;
        bounds
    }
}

impl PickScene for Scene {
    type Node = NodeId;

    fn pickable_bounds(&self, node: NodeId) -> Option<PickableBounds<NodeId>> {
        let n = self.node_opt(node)?;
        let proxy = n.proxy.map(|target| match target {
            ProxyTarget::Node(t) if self.is_alive(t) => Proxy::Node(t),
            ProxyTarget::Node(_) | ProxyTarget::Empty => Proxy::Missing,
            ProxyTarget::Foreign { type_name } => Proxy::Unsupported { type_name },
        });
        Some(PickableBounds {
            volume: n.bounds,
            proxy,
        })
    }

    fn check_pick_mask(&self, node: NodeId, mask: PickMask) -> bool {
        self.node_opt(node).is_some_and(|n| n.mask.intersects(mask))
    }

    fn structure(&self, node: NodeId) -> Structure<'_, NodeId> {
        // Stale ids look like leaves; their mask test fails.
        let Some(n) = self.node_opt(node) else {
            return Structure::Leaf;
        };
        match &n.content {
            Content::Group => Structure::Group {
                children: &n.children,
            },
            Content::Transform(transform) => Structure::TransformGroup {
                children: &n.children,
                transform,
            },
            Content::Leaf(_) => Structure::Leaf,
            Content::Link(target) => Structure::PassThrough {
                child: target.filter(|t| self.is_alive(*t)),
            },
            Content::Custom(_) => Structure::Custom,
        }
    }

    fn produce_children(
        &self,
        node: NodeId,
        probe: &Probe,
        world: &DMat4,
        children: &mut Vec<Option<NodeId>>,
    ) -> Option<LocalTransform> {
        match &self.node_opt(node)?.content {
            Content::Custom(producer) => producer.produce(probe, world, children),
            _ => None,
        }
    }

    fn exact_intersect(
        &self,
        node: NodeId,
        query: &ExactQuery,
        want_closest: bool,
    ) -> Option<HitPayload> {
        match &self.node_opt(node)?.content {
            Content::Leaf(geometry) => geometry.intersect(query, want_closest),
            _ => None,
        }
    }
}
