// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: node identifiers, node content, proxies and errors.

use core::fmt;

use glam::DMat4;
use understory_pick::{LocalTransform, Probe};

use crate::geometry::Geometry;

/// Identifier for a node in the scene.
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// - On insert, a fresh slot starts at generation `1`.
/// - On remove, the slot is freed and every `NodeId` pointing at it becomes stale.
/// - When a freed slot is reused its generation is incremented, so stale ids never
///   alias the new node.
///
/// Use [`Scene::is_alive`](crate::Scene::is_alive) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Produces the children of a custom node for one probe.
///
/// Implemented for every `Fn(&Probe, &DMat4, &mut Vec<Option<NodeId>>) -> Option<LocalTransform>`
/// closure that is `Send + Sync`. `world` is the custom node's local-to-world
/// matrix; the returned transform, if any, applies to all produced children.
pub trait ChildProducer: Send + Sync {
    /// Append this probe's children to `children`.
    fn produce(
        &self,
        probe: &Probe,
        world: &DMat4,
        children: &mut Vec<Option<NodeId>>,
    ) -> Option<LocalTransform>;
}

impl<F> ChildProducer for F
where
    F: Fn(&Probe, &DMat4, &mut Vec<Option<NodeId>>) -> Option<LocalTransform> + Send + Sync,
{
    fn produce(
        &self,
        probe: &Probe,
        world: &DMat4,
        children: &mut Vec<Option<NodeId>>,
    ) -> Option<LocalTransform> {
        self(probe, world, children)
    }
}

/// What a node holds.
pub enum Content {
    /// A plain group; owns its children.
    Group,
    /// A group with a local transform; owns its children.
    Transform(LocalTransform),
    /// Terminal geometry.
    Leaf(Geometry),
    /// A pass-through link to a (possibly shared) node it does not own.
    ///
    /// Several links may target the same subgraph, which makes the scene a DAG.
    Link(Option<NodeId>),
    /// Children produced per probe.
    Custom(Box<dyn ChildProducer>),
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group => f.write_str("Group"),
            Self::Transform(t) => f.debug_tuple("Transform").field(t).finish(),
            Self::Leaf(g) => f.debug_tuple("Leaf").field(g).finish(),
            Self::Link(target) => f.debug_tuple("Link").field(target).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Content {
    /// A transform group. Returns `None` if `forward` is singular.
    pub fn transform(forward: DMat4) -> Option<Self> {
        LocalTransform::new(forward).map(Self::Transform)
    }

    /// A custom node driven by `producer`.
    pub fn custom(producer: impl ChildProducer + 'static) -> Self {
        Self::Custom(Box::new(producer))
    }

    /// Whether the node owns stored children.
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group | Self::Transform(_))
    }
}

/// Substitute geometry picked in place of a node's own content.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProxyTarget {
    /// Pick this node instead. A stale id behaves like [`ProxyTarget::Empty`].
    Node(NodeId),
    /// The proxy resolves to nothing: the node is never hit.
    Empty,
    /// Geometry owned outside this scene that picking cannot descend into.
    Foreign {
        /// Name reported in the pick warning.
        type_name: &'static str,
    },
}

/// Errors from structural edits.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The id no longer refers to a live node.
    #[error("node {0:?} is not alive")]
    Stale(NodeId),
    /// The node cannot own children.
    #[error("node {0:?} is not a group")]
    NotAGroup(NodeId),
    /// The node has no transform to set.
    #[error("node {0:?} is not a transform group")]
    NotATransform(NodeId),
    /// The matrix cannot be inverted.
    #[error("transform is singular")]
    SingularTransform,
    /// The node is not a link.
    #[error("node {0:?} is not a link")]
    NotALink(NodeId),
    /// The edit would let a node reach itself through children, links or proxies.
    #[error("edit at {0:?} would create a cycle")]
    Cycle(NodeId),
}
