// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node capability facade: what the picking core needs from a scene.
//!
//! The core never owns or mutates scene nodes. It addresses them through a
//! small copyable handle ([`PickScene::Node`]) and asks the scene, per handle,
//! for pickable bounds, the pick-mask test, and the node's [`Structure`].
//!
//! ## Coordinate spaces
//!
//! Pickable bounds are expressed in the node's *parent* space. For a transform
//! group this means the bounds already include its own local transform; the
//! traversal tests them before pulling the probe through that transform.

use core::fmt::Debug;

use glam::DMat4;
use understory_bounds3d::{BoundingVolume, is_invertible, uniform_scale};

use crate::probe::Probe;
use crate::types::{ExactQuery, HitPayload, NodeKind, PickMask};

/// A local affine transform together with its inverse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    forward: DMat4,
    inverse: DMat4,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl LocalTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        forward: DMat4::IDENTITY,
        inverse: DMat4::IDENTITY,
    };

    /// Create a transform, computing the inverse. Returns `None` if `forward` is singular.
    pub fn new(forward: DMat4) -> Option<Self> {
        is_invertible(&forward).then(|| Self {
            forward,
            inverse: forward.inverse(),
        })
    }

    /// Create a transform from a known forward/inverse pair.
    pub const fn from_parts(forward: DMat4, inverse: DMat4) -> Self {
        Self { forward, inverse }
    }

    /// Local-to-parent matrix.
    pub const fn forward(&self) -> &DMat4 {
        &self.forward
    }

    /// Parent-to-local matrix.
    pub const fn inverse(&self) -> &DMat4 {
        &self.inverse
    }

    /// Uniform scale of the parent-to-local matrix, used to rescale radii.
    pub fn inverse_scale(&self) -> f64 {
        uniform_scale(&self.inverse)
    }
}

/// What a node's proxy geometry resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Proxy<N> {
    /// Pick against this node instead of the node's own content.
    Node(N),
    /// The proxy slot is empty: the node yields no hit.
    Missing,
    /// The proxy is of a type the traversal cannot descend into.
    Unsupported {
        /// Identity of the offending type, for the warning.
        type_name: &'static str,
    },
}

/// Pickable bounds of a node, in its parent's space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickableBounds<N> {
    /// The volume tested against the probe.
    pub volume: BoundingVolume,
    /// Optional substitute geometry picked instead of the node's content.
    pub proxy: Option<Proxy<N>>,
}

impl<N> PickableBounds<N> {
    /// Bounds without a proxy.
    pub const fn new(volume: BoundingVolume) -> Self {
        Self {
            volume,
            proxy: None,
        }
    }

    /// Attach a proxy.
    pub fn with_proxy(mut self, proxy: Proxy<N>) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

impl<N> From<BoundingVolume> for PickableBounds<N> {
    fn from(volume: BoundingVolume) -> Self {
        Self::new(volume)
    }
}

/// Structural shape of a node, carrying the kind-specific accessors.
#[derive(Clone, Copy, Debug)]
pub enum Structure<'a, N> {
    /// Terminal geometry.
    Leaf,
    /// Stored children, in order. `None` entries are skipped.
    ///
    /// Stored children form a tree: a group never lists one of its ancestors.
    Group {
        /// Pickable children.
        children: &'a [Option<N>],
    },
    /// Stored children under a local transform.
    TransformGroup {
        /// Pickable children.
        children: &'a [Option<N>],
        /// Local transform of the group.
        transform: &'a LocalTransform,
    },
    /// A single child reached without bounds test or transform.
    PassThrough {
        /// The child, if any. A missing child is a valid "no hit".
        child: Option<N>,
    },
    /// Children are produced on demand by [`PickScene::produce_children`].
    Custom,
}

impl<N> Structure<'_, N> {
    /// The structural kind tag.
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Leaf => NodeKind::Leaf,
            Self::Group { .. } => NodeKind::Group,
            Self::TransformGroup { .. } => NodeKind::TransformGroup,
            Self::PassThrough { .. } => NodeKind::PassThrough,
            Self::Custom => NodeKind::Custom,
        }
    }
}

/// The capabilities a scene must expose to be picked.
///
/// The scene is borrowed immutably for the duration of a pick.
pub trait PickScene {
    /// Copyable node handle.
    type Node: Copy + Eq + Debug;

    /// Pickable bounds of `node` in its parent's space; `None` makes the node unpickable.
    fn pickable_bounds(&self, node: Self::Node) -> Option<PickableBounds<Self::Node>>;

    /// Whether the node's own mask intersects `mask`.
    fn check_pick_mask(&self, node: Self::Node, mask: PickMask) -> bool;

    /// Structural shape of the node.
    fn structure(&self, node: Self::Node) -> Structure<'_, Self::Node>;

    /// Structural kind of the node.
    fn kind(&self, node: Self::Node) -> NodeKind {
        self.structure(node).kind()
    }

    /// Produce the children of a [`Structure::Custom`] node.
    ///
    /// `probe` is the request's world-space probe and `world` the node's current
    /// local-to-world matrix. Children are appended to `children`, which arrives
    /// empty; the returned transform, if any, applies to all of them.
    fn produce_children(
        &self,
        node: Self::Node,
        probe: &Probe,
        world: &DMat4,
        children: &mut Vec<Option<Self::Node>>,
    ) -> Option<LocalTransform> {
        let _ = (node, probe, world, children);
        None
    }

    /// Exact line-vs-geometry test for a leaf, in the leaf's coordinates.
    ///
    /// With `want_closest` the nearest primitive must be found; otherwise any
    /// intersecting primitive may be returned. Leaves without exact geometry
    /// return `None`, which counts as a miss when exact picking is requested.
    fn exact_intersect(
        &self,
        node: Self::Node,
        query: &ExactQuery,
        want_closest: bool,
    ) -> Option<HitPayload> {
        let _ = (node, query, want_closest);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn singular_transform_is_rejected() {
        assert!(LocalTransform::new(DMat4::from_scale(DVec3::new(1.0, 0.0, 1.0))).is_none());
    }

    #[test]
    fn transform_round_trip() {
        let t = LocalTransform::new(
            DMat4::from_translation(DVec3::new(3.0, -1.0, 2.0))
                * DMat4::from_rotation_x(0.4)
                * DMat4::from_scale(DVec3::splat(2.0)),
        )
        .unwrap();
        let p = DVec3::new(0.25, 7.0, -3.5);
        let back = t.forward().transform_point3(t.inverse().transform_point3(p));
        assert!((back - p).length() < 1e-12);
        assert!((t.inverse_scale() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn structure_kinds() {
        let children = [Some(1_u32), None];
        let tf = LocalTransform::IDENTITY;
        assert_eq!(Structure::<u32>::Leaf.kind(), NodeKind::Leaf);
        assert_eq!(Structure::Group { children: &children }.kind(), NodeKind::Group);
        assert_eq!(
            Structure::TransformGroup {
                children: &children,
                transform: &tf
            }
            .kind(),
            NodeKind::TransformGroup
        );
        assert_eq!(
            Structure::PassThrough { child: None::<u32> }.kind(),
            NodeKind::PassThrough
        );
        assert_eq!(Structure::<u32>::Custom.kind(), NodeKind::Custom);
    }
}
