// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pick requests and their result sinks.

use glam::{DMat4, DVec3};

use crate::probe::Probe;
use crate::types::{HitPayload, PickMask, SortPolicy};

/// One hit: the root-to-leaf path and what is known about it.
#[derive(Clone, Debug, PartialEq)]
pub struct HitPath<N> {
    /// Nodes from the picked root down to the hit leaf, proxies and pass-through nodes included.
    pub nodes: Vec<N>,
    /// Local-to-world matrix of the leaf.
    ///
    /// Identity unless the request asked for world transforms.
    pub world: DMat4,
    /// Inverse of [`world`](Self::world).
    pub inverse_world: DMat4,
    /// Detail from the leaf's exact geometry test, when one ran.
    pub payload: Option<HitPayload>,
    /// Value the hit was ranked by: a line parameter for rays and segments,
    /// a world distance for other anchored probes, `0` otherwise.
    pub rank: f64,
}

impl<N> Default for HitPath<N> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            world: DMat4::IDENTITY,
            inverse_world: DMat4::IDENTITY,
            payload: None,
            rank: 0.0,
        }
    }
}

impl<N: Copy> HitPath<N> {
    /// The hit leaf.
    pub fn leaf(&self) -> Option<N> {
        self.nodes.last().copied()
    }

    /// The payload's hit point mapped into world space.
    ///
    /// Only meaningful when world transforms were requested.
    pub fn world_point(&self) -> Option<DVec3> {
        self.payload.map(|p| self.world.transform_point3(p.point))
    }
}

/// Result sink of a pick.
///
/// Storage is recycled between picks: paths past the live count keep their
/// allocations and are overwritten by later hits.
#[derive(Clone, Debug)]
pub struct PickResults<N> {
    paths: Vec<HitPath<N>>,
    count: usize,
}

impl<N> Default for PickResults<N> {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            count: 0,
        }
    }
}

impl<N: Copy> PickResults<N> {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live results.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether there are no live results.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Live results.
    pub fn hits(&self) -> &[HitPath<N>] {
        &self.paths[..self.count]
    }

    /// First live result.
    pub fn first(&self) -> Option<&HitPath<N>> {
        self.hits().first()
    }

    /// Iterate live results.
    pub fn iter(&self) -> core::slice::Iter<'_, HitPath<N>> {
        self.hits().iter()
    }

    /// Leaves of the live results, in result order.
    pub fn leaves(&self) -> impl Iterator<Item = N> + '_ {
        self.iter().filter_map(HitPath::leaf)
    }

    /// Drop all live results, keeping storage.
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Overwrite slot `index` and make it the last live result.
    pub(crate) fn record(
        &mut self,
        index: usize,
        nodes: &[N],
        world: DMat4,
        inverse_world: DMat4,
        payload: Option<HitPayload>,
        rank: f64,
    ) {
        debug_assert!(index <= self.count, "results must be recorded densely");
        if index == self.paths.len() {
            self.paths.push(HitPath::default());
        }
        let slot = &mut self.paths[index];
        slot.nodes.clear();
        slot.nodes.extend_from_slice(nodes);
        slot.world = world;
        slot.inverse_world = inverse_world;
        slot.payload = payload;
        slot.rank = rank;
        self.count = index + 1;
    }
}

impl<'a, N: Copy> IntoIterator for &'a PickResults<N> {
    type Item = &'a HitPath<N>;
    type IntoIter = core::slice::Iter<'a, HitPath<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A probe plus everything that shapes how it is answered.
#[derive(Clone, Debug)]
pub struct PickRequest<N> {
    /// World-space probe geometry.
    pub probe: Probe,
    /// How many results and in which order.
    pub sort: SortPolicy,
    /// Only nodes whose mask intersects this one take part.
    pub mask: PickMask,
    /// Fill in [`HitPath::world`] and [`HitPath::inverse_world`].
    pub want_world_transform: bool,
    /// Run leaves' exact geometry tests (ray and segment probes only).
    pub use_exact_geometry: bool,
    /// Output sink.
    pub results: PickResults<N>,
}

impl<N: Copy> PickRequest<N> {
    /// A request matching every mask, without world transforms or exact geometry.
    pub fn new(probe: Probe, sort: SortPolicy) -> Self {
        Self {
            probe,
            sort,
            mask: PickMask::all(),
            want_world_transform: false,
            use_exact_geometry: false,
            results: PickResults::new(),
        }
    }

    /// Restrict the request to `mask`.
    pub fn with_mask(mut self, mask: PickMask) -> Self {
        self.mask = mask;
        self
    }

    /// Ask for world transforms on every hit.
    pub fn with_world_transform(mut self, want: bool) -> Self {
        self.want_world_transform = want;
        self
    }

    /// Ask for exact geometry tests at leaves.
    pub fn with_exact_geometry(mut self, exact: bool) -> Self {
        self.use_exact_geometry = exact;
        self
    }

    /// Number of live results.
    pub fn count(&self) -> usize {
        self.results.len()
    }
}
